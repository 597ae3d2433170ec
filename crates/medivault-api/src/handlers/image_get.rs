use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use medivault_core::models::ImageResponse;
use medivault_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/images/{id}",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image found", body = ImageResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, image_id = %id, operation = "get_image"))]
pub async fn get_image(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let image = state
        .images
        .get(user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    let url = state.images.url(&image);
    Ok(Json(ImageResponse::from_image(image, url)))
}

#[derive(Deserialize, ToSchema, utoipa::IntoParams)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[utoipa::path(
    get,
    path = "/api/v0/images",
    tag = "images",
    params(
        PaginationQuery
    ),
    responses(
        (status = 200, description = "List of the caller's images", body = Vec<ImageResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, pagination),
    fields(
        user_id = %user.id,
        limit = pagination.limit,
        offset = pagination.offset,
        operation = "list_images"
    )
)]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Enforce maximum limit to prevent abuse
    let limit = pagination.limit.clamp(1, 100);
    let offset = pagination.offset.max(0);

    let images = state.images.list(user.id, limit, offset).await?;

    let responses: Vec<ImageResponse> = images
        .into_iter()
        .map(|image| {
            let url = state.images.url(&image);
            ImageResponse::from_image(image, url)
        })
        .collect();

    Ok(Json(responses))
}
