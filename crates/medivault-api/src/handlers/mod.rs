//! HTTP request handlers, one module per operation group.

pub mod analysis;
pub mod auth;
pub mod files;
pub mod health;
pub mod image_delete;
pub mod image_get;
pub mod image_update;
pub mod image_upload;
