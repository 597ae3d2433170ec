//! Storage backend setup

use anyhow::{Context, Result};
use medivault_core::Config;
use medivault_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        path = %config.local_storage_path,
        base_url = %config.local_storage_base_url,
        "Local storage initialized"
    );

    Ok(storage)
}
