//! API constants
//!
//! All routes are versioned under a single prefix.

/// Versioned API path prefix.
pub const API_PREFIX: &str = "/api/v0";
