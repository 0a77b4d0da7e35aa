/// Tenant endpoints
///
/// # Endpoints
///
/// - `POST /api/tenants` - Self-service registration of a tenant and its
///   first admin (public)
/// - `GET /api/tenants` - Current tenant with usage and limits
/// - `GET /api/tenants/users` - Users of the current tenant
/// - `POST /api/tenants/users` - Add a user to the current tenant (admin)
///
/// Registration is the only place a tenant id is created; every other
/// endpoint works on the tenant of the authenticated session.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use tenantboard_shared::{
    auth::{authorization::require_admin, context::AuthContext, password},
    models::{
        tenant::{CreateTenant, SubscriptionPlan, Tenant, TenantStats, TenantStatus},
        user::{normalize_email, CreateUser, User, UserRole},
    },
    quota::{self, QuotaCheckResult, QuotaLimits, QuotaType},
    validation::{normalize_subdomain, validate_subdomain},
};

use super::auth::{hash_password, issue_tokens, SessionResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AppJson,
    response::ApiResponse,
};

/// Tenant registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTenantRequest {
    #[validate(length(min = 1, max = 255, message = "Tenant name must be 1-255 characters"))]
    pub tenant_name: String,

    /// Checked with [`validate_subdomain`] after normalization
    pub subdomain: String,

    #[validate(email(message = "Invalid email format"))]
    pub admin_email: String,

    /// Checked with [`password::validate_password_strength`]
    pub admin_password: String,

    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub admin_full_name: String,
}

/// Request to add a user to the current tenant
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,

    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    pub full_name: String,

    /// Defaults to `user`
    #[serde(default)]
    pub role: UserRole,
}

/// Usage against each subscription limit
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantUsage {
    pub users: QuotaCheckResult,
    pub projects: QuotaCheckResult,
}

/// Current tenant with counters
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantDetails {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub stats: TenantStats,
    pub usage: TenantUsage,
}

fn check_password(field: &str, password: &str) -> ApiResult<()> {
    password::validate_password_strength(password)
        .map_err(|message| ApiError::invalid_field(field, message))
}

/// Tenant registration
///
/// Creates the tenant (status `trial`, plan `free`) and its admin user in one
/// transaction, then signs the admin in.
///
/// ```text
/// POST /api/tenants
///
/// {
///   "tenantName": "Acme Corp",
///   "subdomain": "acme",
///   "adminEmail": "ada@acme.test",
///   "adminPassword": "Str0ng!Pass",
///   "adminFullName": "Ada Lovelace"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Subdomain already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterTenantRequest>,
) -> ApiResult<ApiResponse<SessionResponse>> {
    req.validate()?;

    let subdomain = normalize_subdomain(&req.subdomain);
    validate_subdomain(&subdomain).map_err(|message| ApiError::invalid_field("subdomain", message))?;
    check_password("adminPassword", &req.admin_password)?;

    if Tenant::find_by_subdomain(&state.db, &subdomain).await?.is_some() {
        return Err(ApiError::Conflict("Subdomain is already taken".to_string()));
    }

    let password_hash = hash_password(req.admin_password).await?;

    let mut tx = state.db.begin().await?;

    // A concurrent registration of the same subdomain fails here on the
    // unique constraint and maps to 409
    let tenant = Tenant::create(
        &mut *tx,
        CreateTenant {
            name: req.tenant_name.trim().to_string(),
            subdomain,
            status: TenantStatus::Trial,
            subscription_plan: SubscriptionPlan::Free,
        },
    )
    .await?;

    let admin = User::create(
        &mut *tx,
        CreateUser {
            tenant_id: tenant.id,
            email: req.admin_email,
            password_hash,
            full_name: req.admin_full_name,
            role: UserRole::Admin,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        tenant_id = %tenant.id,
        subdomain = %tenant.subdomain,
        admin_id = %admin.id,
        "Tenant registered"
    );

    let tokens = issue_tokens(&state, &admin)?;

    Ok(ApiResponse::created(SessionResponse {
        user: admin,
        tenant,
        tokens,
    })
    .with_message("Tenant registered successfully"))
}

/// Current tenant details
pub async fn get_current(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiResponse<TenantDetails>> {
    let tenant = Tenant::find_by_id(&state.db, auth.tenant_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))?;

    let stats = Tenant::stats(&state.db, tenant.id).await?;
    let limits = QuotaLimits::from_tenant(&tenant);

    let usage = TenantUsage {
        users: QuotaCheckResult::evaluate(stats.user_count, limits.get(QuotaType::Users)),
        projects: QuotaCheckResult::evaluate(
            stats.project_count,
            limits.get(QuotaType::Projects),
        ),
    };

    Ok(ApiResponse::ok(TenantDetails {
        tenant,
        stats,
        usage,
    }))
}

/// Users of the current tenant
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiResponse<Vec<User>>> {
    let users = User::list_by_tenant(&state.db, auth.tenant_id).await?;
    Ok(ApiResponse::ok(users))
}

/// Adds a user to the current tenant
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin, or the user limit is reached
/// - `409 Conflict`: Email already registered in this tenant
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    AppJson(req): AppJson<CreateTenantUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    require_admin(&auth)?;

    req.validate()?;
    check_password("password", &req.password)?;

    let email = normalize_email(&req.email);
    if User::find_by_email_and_tenant(&state.db, &email, auth.tenant_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "Email already exists in this tenant".to_string(),
        ));
    }

    let password_hash = hash_password(req.password).await?;

    let mut tx = state.db.begin().await?;
    quota::enforce(&mut tx, auth.tenant_id, QuotaType::Users).await?;

    let user = User::create(
        &mut *tx,
        CreateUser {
            tenant_id: auth.tenant_id,
            email,
            password_hash,
            full_name: req.full_name,
            role: req.role,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        tenant_id = %auth.tenant_id,
        user_id = %user.id,
        created_by = %auth.user_id,
        role = user.role.as_str(),
        "User added to tenant"
    );

    Ok(ApiResponse::created(user).with_message("User created successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_field_names() {
        let req: RegisterTenantRequest = serde_json::from_str(
            r#"{
                "tenantName": "Acme Corp",
                "subdomain": "Acme",
                "adminEmail": "ada@acme.test",
                "adminPassword": "Str0ng!Pass",
                "adminFullName": "Ada Lovelace"
            }"#,
        )
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(normalize_subdomain(&req.subdomain), "acme");
    }

    #[test]
    fn test_register_request_rejects_blank_names() {
        let req = RegisterTenantRequest {
            tenant_name: String::new(),
            subdomain: "acme".to_string(),
            admin_email: "bad".to_string(),
            admin_password: "Str0ng!Pass".to_string(),
            admin_full_name: String::new(),
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("tenant_name"));
        assert!(fields.contains_key("admin_email"));
        assert!(fields.contains_key("admin_full_name"));
    }

    #[test]
    fn test_create_user_role_defaults_to_user() {
        let req: CreateTenantUserRequest = serde_json::from_str(
            r#"{"email":"bob@acme.test","password":"Str0ng!Pass","fullName":"Bob"}"#,
        )
        .unwrap();
        assert_eq!(req.role, UserRole::User);

        let req: CreateTenantUserRequest = serde_json::from_str(
            r#"{"email":"eve@acme.test","password":"Str0ng!Pass","fullName":"Eve","role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(req.role, UserRole::Admin);
    }

    #[test]
    fn test_weak_password_is_a_field_error() {
        let err = check_password("adminPassword", "weak").unwrap_err();
        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details[0].field, "adminPassword");
                assert!(details[0].message.contains("at least 8 characters"));
            }
            other => panic!("Unexpected error: {}", other),
        }
    }
}
