//! Authentication: JWT issuance/verification, password hashing, and the
//! request middleware that resolves the calling user.

pub mod jwt;
pub mod middleware;
pub mod password;

pub use middleware::AuthUser;
