/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tenantboard_api::{app::AppState, config::Config};
/// use tenantboard_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database.pool_config()).await?;
/// let state = AppState::new(pool, config);
/// let app = tenantboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{Config, CorsConfig},
    error::ApiError,
    middleware::{auth::authenticate, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request by Axum's `State` extractor; the pool and the
/// `Arc` make that cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Validated startup configuration, read-only
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// HS256 secret for issuing and validating tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /api
/// ├── GET    /health                       (public)
/// ├── /auth
/// │   ├── POST /register-tenant            (public)
/// │   ├── POST /login                      (public)
/// │   ├── POST /refresh                    (public)
/// │   ├── GET  /me
/// │   └── POST /logout
/// ├── /tenants
/// │   ├── POST /                           (public registration)
/// │   ├── GET  /
/// │   ├── GET  /users
/// │   └── POST /users                      (admin)
/// └── /projects
///     ├── GET|POST          /
///     ├── GET|PUT|DELETE    /:project_id   (PUT, DELETE admin)
///     ├── GET|POST          /:project_id/tasks
///     ├── PATCH             /tasks/:task_id/status
///     └── PUT|DELETE        /tasks/:task_id
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. CORS (answers preflights before routing)
/// 3. Request tracing
/// 4. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(routes::health::health_check))
        .route("/api/auth/register-tenant", post(routes::tenants::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/refresh", post(routes::auth::refresh))
        .route("/api/tenants", post(routes::tenants::register));

    // Every handler here takes an `AuthContext`
    let protected_routes = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/tenants", get(routes::tenants::get_current))
        .route(
            "/api/tenants/users",
            get(routes::tenants::list_users).post(routes::tenants::create_user),
        )
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/projects/:project_id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/api/projects/:project_id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/api/projects/tasks/:task_id/status",
            patch(routes::tasks::update_task_status),
        )
        .route(
            "/api/projects/tasks/:task_id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.cors))
        .layer(SecurityHeadersLayer::new(state.config.api.is_production()))
        .with_state(state)
}

/// CORS policy from the startup configuration
///
/// With the dev bypass on, the request's origin is echoed back. Otherwise only
/// listed origins receive CORS headers; requests without an `Origin` header
/// are not affected either way.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.dev_bypass {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(config.allowed_origins.iter().cloned())
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
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
        .max_age(Duration::from_secs(3600))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
