use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use medivault_core::models::{ImageResponse, UpdateImageRequest};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    patch,
    path = "/api/v0/images/{id}",
    tag = "images",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Image updated", body = ImageResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, req), fields(user_id = %user.id, image_id = %id, operation = "update_image"))]
pub async fn update_image(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateImageRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let image = state
        .images
        .update_details(user.id, id, req.title.as_deref(), req.description.as_deref())
        .await?;

    let url = state.images.url(&image);
    Ok(Json(ImageResponse::from_image(image, url)))
}
