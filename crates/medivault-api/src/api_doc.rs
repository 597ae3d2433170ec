//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use medivault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Medivault API",
        version = "0.1.0",
        description = "Medical image management API (v0): user accounts, image upload and retrieval, and segmentation analysis results. All endpoints are versioned under /api/v0/."
    ),
    paths(
        // Auth
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh_token,
        handlers::auth::get_current_user,
        handlers::auth::update_profile,
        handlers::auth::change_password,
        // Images
        handlers::image_upload::upload_image,
        handlers::image_get::get_image,
        handlers::image_get::list_images,
        handlers::image_update::update_image,
        handlers::image_delete::delete_image,
        // Analysis
        handlers::analysis::start_analysis,
        handlers::analysis::get_analysis,
        handlers::analysis::complete_analysis,
    ),
    components(schemas(
        models::RegisterRequest,
        models::LoginRequest,
        models::RefreshRequest,
        models::UpdateProfileRequest,
        models::ChangePasswordRequest,
        models::AuthResponse,
        models::TokenResponse,
        models::UserResponse,
        models::ImageResponse,
        models::UpdateImageRequest,
        models::StartAnalysisResponse,
        models::AnalysisState,
        models::NewAnalysis,
        models::AnalysisResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and profile management"),
        (name = "images", description = "Medical image upload and CRUD"),
        (name = "analysis", description = "Segmentation analysis lifecycle"),
        (name = "internal", description = "Worker-facing routes")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
