/// Authentication middleware
///
/// Runs as a route layer in front of every protected handler:
///
/// 1. Reads `Authorization: Bearer <token>`
/// 2. Verifies signature, expiry, issuer and that it is an access token
/// 3. Loads the user named by the token *within the token's tenant*
/// 4. Rejects unknown or deactivated users
/// 5. Inserts an [`AuthContext`] built from the database row
///
/// Every failure is a 401 with the standard error envelope. Handlers receive
/// the context as an extractor argument and never read the token themselves.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use tenantboard_shared::auth::context::{bearer_token, AuthContext, AuthError};
use tenantboard_shared::auth::jwt;
use tenantboard_shared::models::user::User;

use crate::{app::AppState, error::ApiError};

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let claims = jwt::validate_access_token(token, state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ApiError::from(e)
    })?;

    let user = User::find_by_id_and_tenant(&state.db, claims.sub, claims.tenant_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| {
            tracing::info!(
                user_id = %claims.sub,
                tenant_id = %claims.tenant_id,
                "Token for unknown or inactive user"
            );
            ApiError::from(AuthError::InactiveUser)
        })?;

    req.extensions_mut().insert(AuthContext::from_user(&user));

    Ok(next.run(req).await)
}
