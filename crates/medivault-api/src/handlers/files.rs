//! Stored blob serving for local storage.
//!
//! Keys have the form `images/{user_id}/{filename}`; the route only serves
//! keys under the caller's own prefix, so a guessed key for another user's
//! blob reads as missing.

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use medivault_core::AppError;
use std::sync::Arc;

fn content_type_from_key(key: &str) -> &'static str {
    match key.rsplit('.').next().unwrap_or_default() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "dicom" | "dcm" => "application/dicom",
        _ => "application/octet-stream",
    }
}

#[tracing::instrument(skip(state), fields(user_id = %user.id, storage_key = %key, operation = "serve_file"))]
pub async fn serve_file(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let owner_prefix = format!("images/{}/", user.id);
    if !key.starts_with(&owner_prefix) {
        return Err(HttpAppError(AppError::NotFound(
            "File not found".to_string(),
        )));
    }

    let data = state.storage.download(&key).await.map_err(|e| match e {
        medivault_storage::StorageError::NotFound(_) => {
            AppError::NotFound("File not found".to_string())
        }
        other => AppError::Storage(other.to_string()),
    })?;

    Ok((
        [(header::CONTENT_TYPE, content_type_from_key(&key))],
        data,
    ))
}
