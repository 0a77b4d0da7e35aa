/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register-tenant` - Register a tenant and its first admin
///   (same handler as `POST /api/tenants`)
/// - `POST /api/auth/login` - Exchange credentials for tokens
/// - `POST /api/auth/refresh` - Exchange a refresh token for a new pair
/// - `GET /api/auth/me` - Current user and tenant
/// - `POST /api/auth/logout` - Acknowledge logout
///
/// A user belongs to exactly one tenant and emails are unique only within a
/// tenant, so login names the tenant by subdomain.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use tenantboard_shared::{
    auth::{
        context::AuthContext,
        jwt::{self, TokenPair},
        password,
    },
    models::{
        tenant::Tenant,
        user::{normalize_email, User},
    },
    validation::normalize_subdomain,
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AppJson,
    response::ApiResponse,
};

/// Message for every credential failure, so callers cannot probe which
/// tenants or emails exist
const INVALID_CREDENTIALS: &str = "Invalid email, password or tenant";

/// Login request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Tenant subdomain is required"))]
    pub tenant_subdomain: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// User, tenant and tokens returned by login and registration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub tenant: Tenant,

    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Current user and tenant
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: User,
    pub tenant: Tenant,
}

/// Hashes on the blocking pool; Argon2id takes tens of milliseconds
pub(crate) async fn hash_password(plain: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn verify_password(plain: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn verify_dummy(plain: String) {
    if let Err(e) = tokio::task::spawn_blocking(move || password::verify_dummy(&plain)).await {
        tracing::warn!(error = %e, "Dummy verification task failed");
    }
}

/// Issues tokens for a user with the configured access lifetime
pub(crate) fn issue_tokens(state: &AppState, user: &User) -> ApiResult<TokenPair> {
    Ok(jwt::issue_token_pair(
        user.id,
        user.tenant_id,
        user.role,
        state.jwt_secret(),
        state.config.jwt.access_ttl(),
    )?)
}

/// Login endpoint
///
/// ```text
/// POST /api/auth/login
///
/// { "email": "ada@acme.test", "password": "...", "tenantSubdomain": "acme" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown tenant, unknown email or wrong password (one
///   message for all three), or inactive user
/// - `403 Forbidden`: Tenant is suspended
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    req.validate()?;

    let subdomain = normalize_subdomain(&req.tenant_subdomain);
    let email = normalize_email(&req.email);

    let tenant = Tenant::find_by_subdomain(&state.db, &subdomain).await?;
    let user = match &tenant {
        Some(tenant) => User::find_by_email_and_tenant(&state.db, &email, tenant.id).await?,
        None => None,
    };

    let (tenant, user) = match (tenant, user) {
        (Some(tenant), Some(user)) => (tenant, user),
        _ => {
            // Same work as a real check, so timing does not reveal accounts
            verify_dummy(req.password).await;
            tracing::info!(subdomain = %subdomain, "Login failed: unknown tenant or email");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    if !verify_password(req.password, user.password_hash.clone()).await? {
        tracing::info!(
            user_id = %user.id,
            tenant_id = %tenant.id,
            "Login failed: wrong password"
        );
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if !tenant.status.allows_login() {
        tracing::info!(tenant_id = %tenant.id, "Login refused: tenant suspended");
        return Err(ApiError::Forbidden("Tenant account is suspended".to_string()));
    }

    if !user.is_active {
        tracing::info!(user_id = %user.id, "Login refused: user inactive");
        return Err(ApiError::Unauthorized("User account is inactive".to_string()));
    }

    User::update_last_login(&state.db, user.id, tenant.id).await?;
    let tokens = issue_tokens(&state, &user)?;

    tracing::info!(user_id = %user.id, tenant_id = %tenant.id, "User logged in");

    Ok(ApiResponse::ok(SessionResponse {
        user,
        tenant,
        tokens,
    })
    .with_message("Login successful"))
}

/// Token refresh endpoint
///
/// Re-reads the user so a deactivated account cannot refresh, and the new
/// access token carries the current role.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired or non-refresh token; user gone or
///   inactive
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(req): AppJson<RefreshRequest>,
) -> ApiResult<ApiResponse<TokenPair>> {
    req.validate()?;

    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = User::find_by_id_and_tenant(&state.db, claims.sub, claims.tenant_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::Unauthorized("User not found or inactive".to_string()))?;

    let tenant = Tenant::find_by_id(&state.db, user.tenant_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Tenant no longer exists".to_string()))?;

    if !tenant.status.allows_login() {
        return Err(ApiError::Forbidden("Tenant account is suspended".to_string()));
    }

    Ok(ApiResponse::ok(issue_tokens(&state, &user)?))
}

/// Current user endpoint
pub async fn me(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiResponse<MeResponse>> {
    let user = User::find_by_id_and_tenant(&state.db, auth.user_id, auth.tenant_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found or inactive".to_string()))?;

    let tenant = Tenant::find_by_id(&state.db, auth.tenant_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Tenant no longer exists".to_string()))?;

    Ok(ApiResponse::ok(MeResponse { user, tenant }))
}

/// Logout endpoint
///
/// Tokens are stateless; the client discards them. The call exists so
/// clients have one place to hook logout and so it shows up in logs.
pub async fn logout(auth: AuthContext) -> ApiResponse<Option<()>> {
    tracing::info!(user_id = %auth.user_id, tenant_id = %auth.tenant_id, "User logged out");
    ApiResponse::ok(None).with_message("Logged out successfully")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_uses_camel_case() {
        let req: LoginRequest = serde_json::from_str(
            r#"{"email":"ada@acme.test","password":"x","tenantSubdomain":"acme"}"#,
        )
        .unwrap();

        assert_eq!(req.tenant_subdomain, "acme");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_request_validation() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
            tenant_subdomain: String::new(),
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("tenant_subdomain"));
    }

    #[tokio::test]
    async fn test_blocking_hash_round_trip() {
        let hash = hash_password("Str0ng!Pass".to_string()).await.unwrap();
        assert!(verify_password("Str0ng!Pass".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }
}
