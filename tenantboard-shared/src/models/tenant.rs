/// Tenant model and database operations
///
/// A tenant is an isolated customer organization and the unit of data
/// partitioning. Tenants are created by self-service registration together
/// with their first admin user, and are never deleted through the API.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tenants (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     subdomain VARCHAR(63) NOT NULL UNIQUE,
///     status tenant_status NOT NULL DEFAULT 'active',
///     subscription_plan subscription_plan NOT NULL DEFAULT 'free',
///     max_users INTEGER NOT NULL DEFAULT 5,
///     max_projects INTEGER NOT NULL DEFAULT 3,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tenantboard_shared::models::tenant::{CreateTenant, SubscriptionPlan, Tenant, TenantStatus};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let tenant = Tenant::create(
///     &pool,
///     CreateTenant {
///         name: "Acme Corp".to_string(),
///         subdomain: "acme".to_string(),
///         status: TenantStatus::Trial,
///         subscription_plan: SubscriptionPlan::Free,
///     },
/// )
/// .await?;
///
/// assert_eq!(tenant.max_projects, 3);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::quota::QuotaLimits;

/// Name of the unique constraint on `tenants.subdomain`
pub const SUBDOMAIN_CONSTRAINT: &str = "tenants_subdomain_key";

/// Tenant lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    /// Normal operation
    Active,

    /// Logins are refused
    Suspended,

    /// Evaluation period
    Trial,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Suspended => "suspended",
            TenantStatus::Trial => "trial",
        }
    }

    /// Whether users of this tenant may sign in
    pub fn allows_login(&self) -> bool {
        !matches!(self, TenantStatus::Suspended)
    }
}

/// Billing tier
///
/// The tier seeds the tenant's `max_users` / `max_projects` columns at
/// registration; see [`QuotaLimits::for_plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl SubscriptionPlan {
    /// Converts plan to its database label
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Pro => "pro",
            SubscriptionPlan::Enterprise => "enterprise",
        }
    }
}

/// Customer organization
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Unique lowercase label identifying the tenant at login
    pub subdomain: String,

    pub status: TenantStatus,

    pub subscription_plan: SubscriptionPlan,

    /// Maximum number of users (authoritative limit)
    pub max_users: i32,

    /// Maximum number of projects (authoritative limit)
    pub max_projects: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a tenant
#[derive(Debug, Clone)]
pub struct CreateTenant {
    pub name: String,

    /// Must already be normalized with
    /// [`normalize_subdomain`](crate::validation::normalize_subdomain)
    pub subdomain: String,

    /// Self-service registrations start as `trial`
    pub status: TenantStatus,

    pub subscription_plan: SubscriptionPlan,
}

/// Resource usage of a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TenantStats {
    pub user_count: i64,
    pub project_count: i64,
    pub task_count: i64,
}

const TENANT_COLUMNS: &str = "id, name, subdomain, status, subscription_plan, \
                              max_users, max_projects, created_at, updated_at";

impl Tenant {
    /// Inserts a tenant with the plan's default limits
    ///
    /// # Errors
    ///
    /// Fails with a database error on the [`SUBDOMAIN_CONSTRAINT`] unique
    /// violation if the subdomain is taken.
    pub async fn create<'e, E>(executor: E, data: CreateTenant) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let limits = QuotaLimits::for_plan(data.subscription_plan);

        sqlx::query_as::<_, Tenant>(&format!(
            r#"
            INSERT INTO tenants (name, subdomain, status, subscription_plan, max_users, max_projects)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TENANT_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.subdomain)
        .bind(data.status)
        .bind(data.subscription_plan)
        .bind(limits.max_users)
        .bind(limits.max_projects)
        .fetch_one(executor)
        .await
    }

    /// Finds a tenant by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a tenant by its (normalized) subdomain
    pub async fn find_by_subdomain<'e, E>(
        executor: E,
        subdomain: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE subdomain = $1"
        ))
        .bind(subdomain)
        .fetch_optional(executor)
        .await
    }

    /// Loads the tenant row and holds a row lock until the transaction ends
    ///
    /// Serializes limit checks of concurrent creations within one tenant.
    pub async fn lock_for_update<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Counts users, projects and tasks of a tenant
    pub async fn stats<'e, E>(executor: E, id: Uuid) -> Result<TenantStats, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TenantStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE tenant_id = $1) AS user_count,
                (SELECT COUNT(*) FROM projects WHERE tenant_id = $1) AS project_count,
                (SELECT COUNT(*) FROM tasks WHERE tenant_id = $1) AS task_count
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await
    }

    /// Deletes a tenant and, by cascade, all of its rows
    ///
    /// Not exposed over HTTP; used for test cleanup and administration.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
