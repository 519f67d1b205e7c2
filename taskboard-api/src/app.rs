/// Application state and router builder
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                    # Health check (public)
/// ├── /api/auth/                 # Authentication endpoints
/// │   ├── POST /register         # (public)
/// │   ├── POST /login            # (public)
/// │   ├── POST /refresh          # (public)
/// │   └── POST /logout           # (requires access token)
/// └── /api/tasks/                # Owner-scoped task CRUD (requires access token)
///     ├── GET    /
///     ├── POST   /
///     ├── GET    /:id
///     ├── PATCH  /:id
///     ├── DELETE /:id
///     └── POST   /:id/toggle
/// ```
///
/// Unmatched routes fall back to `404 {"error": "Route not found"}`.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top): request tracing, CORS, security
/// headers, and per-route access-token verification.

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::{
    jwt::TokenConfig,
    middleware::{require_access_token, AuthError},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; `Arc`
/// keeps the clone cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the token signing configuration
    pub fn token_config(&self) -> &TokenConfig {
        &self.config.tokens
    }
}

/// Builds the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .merge(
            Router::new()
                .route("/logout", post(routes::auth::logout))
                .route_layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    access_token_layer,
                )),
        );

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/toggle", post(routes::tasks::toggle_task_status))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access_token_layer,
        ));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/tasks", task_routes)
        .fallback(route_not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::security::security_headers,
        ))
        .layer(build_cors(&state.config))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Access-token verification layer.
///
/// Thin adapter feeding the configured secrets into the shared middleware.
async fn access_token_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    require_access_token(state.config.tokens.clone(), req, next).await
}

/// Builds the CORS layer from the static origin allow-list.
///
/// A `*` entry switches to permissive mode for development; otherwise the
/// listed origins are allowed with credentials.
fn build_cors(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(86400))
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}
