/// Health check endpoint
///
/// Liveness plus a database round trip. Not authenticated.
///
/// # Endpoint
///
/// ```text
/// GET /api/health
/// ```
///
/// # Responses
///
/// `200 OK` when the database answers:
///
/// ```json
/// { "status": "ok", "database": "connected", "version": "0.1.0", "timestamp": "..." }
/// ```
///
/// `500 Internal Server Error` otherwise:
///
/// ```json
/// { "status": "error", "database": "disconnected", "message": "...", "timestamp": "..." }
/// ```

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tenantboard_shared::db::pool;

use crate::app::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `error`
    pub status: String,

    /// `connected` or `disconnected`
    pub database: String,

    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub timestamp: DateTime<Utc>,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let version = env!("CARGO_PKG_VERSION").to_string();

    match pool::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database: "connected".to_string(),
                version,
                message: None,
                timestamp: Utc::now(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed: database unreachable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error".to_string(),
                    database: "disconnected".to_string(),
                    version,
                    message: Some("Database connection failed".to_string()),
                    timestamp: Utc::now(),
                }),
            )
        }
    }
}
