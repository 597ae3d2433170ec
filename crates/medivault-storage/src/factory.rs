use crate::{LocalStorage, Storage, StorageResult};
use medivault_core::Config;
use std::sync::Arc;

/// Create the storage backend from configuration.
///
/// The local filesystem backend is the only one compiled in; an object
/// store implementation would be selected here as well.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(
        config.local_storage_path.clone(),
        config.local_storage_base_url.clone(),
    )
    .await?;
    Ok(Arc::new(storage))
}
