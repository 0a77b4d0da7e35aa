/// Per-request authentication context
///
/// The API's authentication middleware resolves the bearer token, loads the
/// user and inserts an [`AuthContext`] into the request extensions. Handlers
/// take it as an extractor:
///
/// ```no_run
/// use tenantboard_shared::auth::context::AuthContext;
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("User {} in tenant {}", auth.user_id, auth.tenant_id)
/// }
/// ```
///
/// Extracting it on a route the middleware did not run on is a 401, never a
/// panic.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::user::{User, UserRole};

/// Identity of the caller, bound to one tenant for the whole request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: Uuid,
    pub tenant_id: Uuid,

    /// Role as currently stored, not as recorded in the token
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            tenant_id: user.tenant_id,
            role: user.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Authentication failure
///
/// Every variant answers 401 with the standard error envelope. The message
/// never says whether the token, the user or the tenant was the problem
/// beyond what the client already knows.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingCredentials,

    #[error("Authorization header must use the Bearer scheme")]
    InvalidFormat,

    #[error("User not found or inactive")]
    InactiveUser,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": "unauthorized",
            "message": self.to_string(),
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidFormat)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}
