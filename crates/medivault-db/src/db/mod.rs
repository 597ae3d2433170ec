//! Database repositories for data access layer
//!
//! One repository per domain entity. Repositories own the SQL; handlers never
//! build queries themselves.

pub mod analyses;
pub mod images;
pub mod transaction;
pub mod users;

pub use analyses::AnalysisRepository;
pub use images::{ImageRepository, StartAnalysisError};
pub use users::UserRepository;
