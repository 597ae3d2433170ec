use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use medivault_core::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
    TokenResponse, UpdateProfileRequest, UserResponse,
};
use medivault_core::AppError;
use std::sync::Arc;

const MIN_PASSWORD_LENGTH: usize = 8;

fn validate_email(email: &str) -> Result<(), AppError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') || trimmed.starts_with('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v0/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, req), fields(operation = "register"))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;
    let user = state
        .users
        .create(
            req.email.trim(),
            &password_hash,
            req.first_name.trim(),
            req.last_name.trim(),
        )
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let (token, refresh) = state.jwt.generate_token_pair(user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(user),
            token,
            refresh,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v0/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account disabled", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, req), fields(operation = "login"))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Unknown email and wrong password produce the same response
    let user = state
        .users
        .get_by_email(req.email.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(HttpAppError(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        )));
    }

    if !user.is_active {
        return Err(HttpAppError(AppError::Forbidden(
            "Account is disabled".to_string(),
        )));
    }

    let (token, refresh) = state.jwt.generate_token_pair(user.id)?;
    Ok(Json(AuthResponse {
        user: UserResponse::from(user),
        token,
        refresh,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v0/auth/token/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = TokenResponse),
        (status = 401, description = "Invalid refresh token", body = ErrorResponse),
        (status = 403, description = "Account disabled", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, req), fields(operation = "refresh_token"))]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let claims = state.jwt.verify_refresh_token(&req.refresh)?;

    let user = state
        .users
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    if !user.is_active {
        return Err(HttpAppError(AppError::Forbidden(
            "Account is disabled".to_string(),
        )));
    }

    let token = state.jwt.generate_access_token(user.id)?;
    Ok(Json(TokenResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/v0/auth/user",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.id, operation = "get_current_user"))]
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .users
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/api/v0/auth/user",
    tag = "auth",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, req), fields(user_id = %user.id, operation = "update_profile"))]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let updated = state
        .users
        .update_profile(user.id, req.first_name.as_deref(), req.last_name.as_deref())
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v0/auth/change-password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, req), fields(user_id = %user.id, operation = "change_password"))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .users
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&req.old_password, &record.password_hash)? {
        return Err(HttpAppError(AppError::Validation(
            "Old password is incorrect".to_string(),
        )));
    }

    validate_password(&req.new_password)?;
    let password_hash = hash_password(&req.new_password)?;
    state.users.update_password(user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}
