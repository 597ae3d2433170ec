//! Medivault API Library
//!
//! HTTP handlers, auth, and application setup for the medical image service.

mod api_doc;
pub mod constants;
mod handlers;
mod telemetry;

// Public modules
pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
