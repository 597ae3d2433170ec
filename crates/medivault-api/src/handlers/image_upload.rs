use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use medivault_core::models::ImageResponse;
use medivault_core::AppError;
use medivault_processing::extract_dimensions;
use std::sync::Arc;
use uuid::Uuid;

struct UploadForm {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
    title: String,
    description: String,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut title = String::new();
    let mut description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(ToString::to_string)
                    .ok_or_else(|| AppError::Validation("File field has no filename".to_string()))?;
                let content_type = field.content_type().map(ToString::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?
                    .to_vec();
                file = Some((filename, content_type, data));
            }
            "title" => {
                title = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid title field: {}", e)))?;
            }
            "description" => {
                description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid description field: {}", e)))?;
            }
            _ => {}
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::Validation("Missing file field".to_string()))?;

    Ok(UploadForm {
        filename,
        content_type,
        data,
        title,
        description,
    })
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "dicom" | "dcm" => "application/dicom",
        _ => "application/octet-stream",
    }
}

fn extension_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

#[utoipa::path(
    post,
    path = "/api/v0/images",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded", body = ImageResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.id, operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_form(multipart).await?;

    state.validator.validate_extension(&form.filename)?;
    state.validator.validate_file_size(form.data.len())?;

    let extension = extension_of(&form.filename);
    let content_type = form
        .content_type
        .filter(|ct| ct != "application/octet-stream")
        .unwrap_or_else(|| content_type_for(&extension).to_string());

    // Stored under a fresh name so repeated uploads of the same filename
    // cannot share a blob
    let stored_filename = format!("{}.{}", Uuid::new_v4(), extension);

    // Non-raster payloads (DICOM) simply carry no dimensions
    let dimensions = extract_dimensions(&form.data).await;

    let image = state
        .images
        .create(
            user.id,
            &stored_filename,
            &content_type,
            form.data,
            form.title,
            form.description,
            dimensions.map(|d| d.width as i32),
            dimensions.map(|d| d.height as i32),
        )
        .await?;

    tracing::info!(image_id = %image.id, file_size = image.file_size, "Image uploaded");

    let url = state.images.url(&image);
    Ok((
        StatusCode::CREATED,
        Json(ImageResponse::from_image(image, url)),
    ))
}
