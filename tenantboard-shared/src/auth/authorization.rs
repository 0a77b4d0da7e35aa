/// Role checks
///
/// Two roles exist within a tenant: `admin` and `user`. Admin satisfies any
/// requirement; user satisfies only `user`. Tenant isolation is not handled
/// here: every query is scoped by the context's `tenant_id`, and rows of
/// another tenant simply do not exist for the caller.
///
/// # Example
///
/// ```
/// use tenantboard_shared::auth::authorization::require_role;
/// use tenantboard_shared::auth::context::AuthContext;
/// use tenantboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let ctx = AuthContext { user_id: Uuid::new_v4(), tenant_id: Uuid::new_v4(), role: UserRole::User };
/// assert!(require_role(&ctx, UserRole::User).is_ok());
/// assert!(require_role(&ctx, UserRole::Admin).is_err());
/// ```

use super::context::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller's role is below the requirement
    #[error("Insufficient permissions: requires {}, has {}", .required.as_str(), .actual.as_str())]
    InsufficientRole { required: UserRole, actual: UserRole },
}

/// Requires the caller to hold `required` or a higher role
///
/// Runs before any lookup of the target resource, so a forbidden caller
/// learns nothing about whether the resource exists.
pub fn require_role(ctx: &AuthContext, required: UserRole) -> Result<(), AuthzError> {
    if !ctx.role.has_permission(&required) {
        tracing::debug!(
            user_id = %ctx.user_id,
            tenant_id = %ctx.tenant_id,
            required = required.as_str(),
            actual = ctx.role.as_str(),
            "Role check failed"
        );
        return Err(AuthzError::InsufficientRole {
            required,
            actual: ctx.role,
        });
    }

    Ok(())
}

/// Shorthand for `require_role(ctx, UserRole::Admin)`
pub fn require_admin(ctx: &AuthContext) -> Result<(), AuthzError> {
    require_role(ctx, UserRole::Admin)
}
