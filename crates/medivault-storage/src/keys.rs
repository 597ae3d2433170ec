//! Shared key generation for storage backends.
//!
//! Key format: `images/{user_id}/{filename}`. Scoping keys by owner keeps
//! the on-disk layout aligned with the ownership model.

use uuid::Uuid;

/// Generate a storage key for the given owner and filename.
pub fn generate_storage_key(user_id: Uuid, filename: &str) -> String {
    format!("images/{}/{}", user_id, filename)
}
