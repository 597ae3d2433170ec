//! Data models for the application
//!
//! Domain entities and their request/response DTOs, organized per resource.

mod analysis;
mod image;
mod user;

// Re-export all models for convenient imports
pub use analysis::*;
pub use image::*;
pub use user::*;
