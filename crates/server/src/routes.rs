//! Route configuration.

use crate::auth::session_middleware;
use crate::error::ApiError;
use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use cfipd_core::API_KEY_HEADER;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Turn a handler panic into the usual JSON 500.
fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::Internal("handler panicked".to_string()).into_response()
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        .route("/logout", get(handlers::logout));

    let api_routes = Router::new()
        .route("/upload", post(handlers::upload))
        .route("/clear-files", post(handlers::clear_files))
        .route("/generate-api-key", post(handlers::generate_api_key))
        .route("/uploads/{filename}", get(handlers::get_upload))
        .route("/files", get(handlers::list_files))
        // Health check (intentionally unauthenticated for probes)
        .route("/health", get(handlers::health_check));

    let mut router = Router::new().merge(page_routes).merge(api_routes);

    // SECURITY: When enabled, this endpoint MUST be network-restricted
    // to the Prometheus scraper. See crate::metrics for details.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    // Middleware layers are applied in reverse order (outermost last).
    // Order of execution: TraceLayer -> CatchPanic -> CORS -> Session -> Handler
    let mut router = router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.config.server.body_limit()));

    if state.config.server.cors_enabled {
        router = router.layer(cors_layer());
    }

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
