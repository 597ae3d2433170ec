//! Request authentication middleware.
//!
//! Bearer JWT auth for user-facing routes, and a shared-secret check for the
//! analysis worker's internal write-back route.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use medivault_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Authenticated caller, resolved by `auth_middleware` and stored in
/// request extensions.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Authentication required".to_string(),
                ))
            })
    }
}

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".to_string()))
}

/// Resolve the bearer token to an active user and attach it to the request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    // Resolved to an owned token before the async block: holding `&Request`
    // across an await would make the future non-Send (Body is not Sync).
    let token_result = bearer_token(&request).map(str::to_owned);
    let result = async {
        let token = token_result?;
        let claims = state.jwt.verify_access_token(&token)?;

        let user = state
            .users
            .get_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled".to_string()));
        }

        Ok(AuthUser { id: user.id })
    }
    .await;

    match result {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}

#[derive(Clone)]
pub struct ServiceAuthState {
    pub service_api_key: String,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Shared-secret auth for the internal worker route.
pub async fn service_auth_middleware(
    State(auth): State<Arc<ServiceAuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = match bearer_token(&request) {
        Ok(token) => token,
        Err(e) => return HttpAppError(e).into_response(),
    };

    if !secure_compare(presented, &auth.service_api_key) {
        return HttpAppError(AppError::Unauthorized(
            "Invalid service credentials".to_string(),
        ))
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_compare_requires_exact_match() {
        assert!(secure_compare("abc123", "abc123"));
        assert!(!secure_compare("abc123", "abc124"));
        assert!(!secure_compare("abc123", "abc12"));
    }
}
