//! Application state.
//!
//! A single state struct shared behind `Arc`; handlers reach the repositories
//! and services through it.

use crate::auth::jwt::JwtService;
use medivault_core::Config;
use medivault_db::{AnalysisRepository, ImageRepository, UserRepository};
use medivault_processing::UploadValidator;
use medivault_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

pub struct AppState {
    pub pool: PgPool,
    pub users: UserRepository,
    pub images: ImageRepository,
    pub analyses: AnalysisRepository,
    pub storage: Arc<dyn Storage>,
    pub validator: UploadValidator,
    pub jwt: JwtService,
    pub config: Config,
    pub is_production: bool,
}

impl AppState {
    pub fn new(pool: PgPool, storage: Arc<dyn Storage>, config: Config) -> Self {
        let is_production = config.is_production();
        AppState {
            users: UserRepository::new(pool.clone()),
            images: ImageRepository::new(pool.clone(), storage.clone()),
            analyses: AnalysisRepository::new(pool.clone()),
            validator: UploadValidator::new(
                config.max_upload_size_bytes,
                config.allowed_extensions.clone(),
            ),
            jwt: JwtService::new(
                &config.jwt_secret,
                config.jwt_expiry_hours,
                config.refresh_expiry_days,
            ),
            pool,
            storage,
            config,
            is_production,
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
