/// API route handlers
///
/// Handlers are grouped by resource:
///
/// - `health`: Liveness and database connectivity
/// - `auth`: Login, token refresh, current user, logout
/// - `tenants`: Tenant registration, details and user management
/// - `projects`: Tenant-scoped project CRUD
/// - `tasks`: Tasks nested under projects
///
/// Handlers take the tenant id from [`AuthContext`](tenantboard_shared::auth::context::AuthContext)
/// and pass it into every query. A project or task of another tenant is
/// indistinguishable from one that does not exist.

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod tenants;
