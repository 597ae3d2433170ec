//! Analysis lifecycle handlers.
//!
//! `start_analysis` claims the image for the worker; `complete_analysis` is
//! the worker's write-back route, mounted behind the service-key middleware.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use medivault_core::models::{AnalysisResponse, NewAnalysis, StartAnalysisResponse};
use medivault_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v0/images/{id}/start-analysis",
    tag = "analysis",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Analysis started", body = StartAnalysisResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 409, description = "Analysis already started or completed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, image_id = %id, operation = "start_analysis"))]
pub async fn start_analysis(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let image = state
        .images
        .start_analysis(user.id, id)
        .await
        .map_err(AppError::from)?;

    // The claiming update always sets the timestamp
    let analysis_started_at = image
        .analysis_started_at
        .ok_or_else(|| AppError::Internal("Claimed image has no start timestamp".to_string()))?;

    tracing::info!(image_id = %id, "Analysis started");

    Ok(Json(StartAnalysisResponse {
        message: "Analysis started".to_string(),
        image_id: image.id,
        analysis_started_at,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v0/images/{id}/analysis",
    tag = "analysis",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Analysis result", body = AnalysisResponse),
        (status = 404, description = "Image or analysis not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, image_id = %id, operation = "get_analysis"))]
pub async fn get_analysis(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    // 404 for a foreign or missing image before looking at results
    state
        .images
        .get(user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    let analysis = state
        .analyses
        .get_for_image(user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("No analysis results for this image".to_string()))?;

    Ok(Json(AnalysisResponse::from(analysis)))
}

#[utoipa::path(
    post,
    path = "/api/v0/internal/images/{id}/analysis",
    tag = "internal",
    params(
        ("id" = Uuid, Path, description = "Image ID")
    ),
    request_body = NewAnalysis,
    responses(
        (status = 201, description = "Result recorded", body = AnalysisResponse),
        (status = 401, description = "Invalid service credentials", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 409, description = "Result already recorded", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, req), fields(image_id = %id, operation = "complete_analysis"))]
pub async fn complete_analysis(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<NewAnalysis>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Classify a missing image as 404 before the insert would hit the FK
    state
        .images
        .get_any(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    let analysis = state.analyses.create_for_image(id, req).await?;

    tracing::info!(image_id = %id, analysis_id = %analysis.id, "Analysis result recorded");

    Ok((StatusCode::CREATED, Json(AnalysisResponse::from(analysis))))
}
