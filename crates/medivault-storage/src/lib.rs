//! Medivault Storage Library
//!
//! Blob storage abstraction for image payloads. The API and repositories
//! only see the `Storage` trait; the local filesystem backend is the
//! implementation compiled in here, and an object store would slot in
//! behind the same trait.
//!
//! # Storage key format
//!
//! Keys are owner-scoped: `images/{user_id}/{filename}`. Keys must not
//! contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub(crate) mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
