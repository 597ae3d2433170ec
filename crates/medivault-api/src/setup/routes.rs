//! Route configuration and setup.

use crate::auth::middleware::{auth_middleware, service_auth_middleware, ServiceAuthState};
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use medivault_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

// Headroom above the payload limit for multipart framing and text fields
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness_check))
        .route("/api/openapi.json", get(serve_openapi))
        .route(
            &format!("{}/auth/register", API_PREFIX),
            post(handlers::auth::register),
        )
        .route(
            &format!("{}/auth/login", API_PREFIX),
            post(handlers::auth::login),
        )
        .route(
            &format!("{}/auth/token/refresh", API_PREFIX),
            post(handlers::auth::refresh_token),
        )
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route(
            &format!("{}/auth/user", API_PREFIX),
            get(handlers::auth::get_current_user).patch(handlers::auth::update_profile),
        )
        .route(
            &format!("{}/auth/change-password", API_PREFIX),
            post(handlers::auth::change_password),
        )
        .route(
            &format!("{}/images", API_PREFIX),
            post(handlers::image_upload::upload_image).get(handlers::image_get::list_images),
        )
        .route(
            &format!("{}/images/{{id}}", API_PREFIX),
            get(handlers::image_get::get_image)
                .patch(handlers::image_update::update_image)
                .delete(handlers::image_delete::delete_image),
        )
        .route(
            &format!("{}/images/{{id}}/start-analysis", API_PREFIX),
            post(handlers::analysis::start_analysis),
        )
        .route(
            &format!("{}/images/{{id}}/analysis", API_PREFIX),
            get(handlers::analysis::get_analysis),
        )
        .route("/files/{*key}", get(handlers::files::serve_file))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    let mut app = public_routes.merge(protected_routes);

    // Worker write-back route, only mounted when a service key is configured
    if let Some(key) = &config.service_api_key {
        let service_state = Arc::new(ServiceAuthState {
            service_api_key: key.clone(),
        });
        let internal_routes = Router::new()
            .route(
                &format!("{}/internal/images/{{id}}/analysis", API_PREFIX),
                post(handlers::analysis::complete_analysis),
            )
            .route_layer(axum::middleware::from_fn_with_state(
                service_state,
                service_auth_middleware,
            ))
            .with_state(state.clone());
        app = app.merge(internal_routes);
    } else {
        tracing::warn!("SERVICE_API_KEY not set; analysis write-back route disabled");
    }

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let app = app
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config.max_upload_size_bytes + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(crate::api_doc::get_openapi_spec())
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ])
    };

    Ok(cors)
}
