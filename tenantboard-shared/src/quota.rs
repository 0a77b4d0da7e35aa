/// Subscription limit enforcement
///
/// Each tenant carries `max_users` and `max_projects` columns. They are seeded
/// from the subscription plan at registration and are authoritative afterwards,
/// so support can raise a single tenant's limit without a plan change.
///
/// # Default limits by plan
///
/// | Plan       | Users | Projects |
/// |------------|-------|----------|
/// | free       | 5     | 3        |
/// | pro        | 25    | 15       |
/// | enterprise | 100   | 50       |
///
/// # Concurrency
///
/// [`enforce`] locks the tenant row with `SELECT ... FOR UPDATE` before
/// counting. The caller inserts in the same transaction, so two concurrent
/// creations cannot both observe `limit - 1` and overshoot. A rejected
/// creation never reaches the insert.
///
/// # Example
///
/// ```no_run
/// use tenantboard_shared::models::project::{CreateProject, Project};
/// use tenantboard_shared::quota::{self, QuotaType};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, tenant_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
///
/// quota::enforce(&mut tx, tenant_id, QuotaType::Projects).await?;
///
/// let project = Project::create(
///     &mut *tx,
///     CreateProject {
///         tenant_id,
///         name: "Q3 launch".to_string(),
///         description: None,
///         status: None,
///         created_by: None,
///     },
/// )
/// .await?;
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::project::Project;
use crate::models::tenant::{SubscriptionPlan, Tenant};
use crate::models::user::User;

/// Quota enforcement error
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// Creating one more resource would exceed the tenant's limit
    #[error("{} limit exceeded ({current}/{limit})", .quota_type.as_str())]
    LimitExceeded {
        quota_type: QuotaType,
        limit: i64,
        current: i64,
    },

    /// Tenant row not found
    #[error("Tenant not found: {0}")]
    TenantNotFound(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Limited resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaType {
    /// Users of the tenant
    Users,

    /// Projects of the tenant
    Projects,
}

impl QuotaType {
    /// Human-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaType::Users => "User",
            QuotaType::Projects => "Project",
        }
    }
}

/// Resource limits of one tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLimits {
    pub max_users: i32,
    pub max_projects: i32,
}

impl QuotaLimits {
    /// Default limits for a plan
    pub fn for_plan(plan: SubscriptionPlan) -> Self {
        match plan {
            SubscriptionPlan::Free => QuotaLimits {
                max_users: 5,
                max_projects: 3,
            },
            SubscriptionPlan::Pro => QuotaLimits {
                max_users: 25,
                max_projects: 15,
            },
            SubscriptionPlan::Enterprise => QuotaLimits {
                max_users: 100,
                max_projects: 50,
            },
        }
    }

    /// Limits stored on the tenant row
    pub fn from_tenant(tenant: &Tenant) -> Self {
        QuotaLimits {
            max_users: tenant.max_users,
            max_projects: tenant.max_projects,
        }
    }

    /// Gets the limit for a quota type
    pub fn get(&self, quota_type: QuotaType) -> i64 {
        match quota_type {
            QuotaType::Users => i64::from(self.max_users),
            QuotaType::Projects => i64::from(self.max_projects),
        }
    }
}

/// Result of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaCheckResult {
    /// Whether one more resource may be created
    pub allowed: bool,

    /// Current usage
    pub current: i64,

    /// Maximum allowed
    pub limit: i64,

    /// Remaining headroom
    pub remaining: i64,
}

impl QuotaCheckResult {
    /// Evaluates usage against a limit
    pub fn evaluate(current: i64, limit: i64) -> Self {
        QuotaCheckResult {
            allowed: current < limit,
            current,
            limit,
            remaining: (limit - current).max(0),
        }
    }

    /// Converts a failed check into an error
    pub fn into_result(self, quota_type: QuotaType) -> Result<Self, QuotaError> {
        if self.allowed {
            Ok(self)
        } else {
            Err(QuotaError::LimitExceeded {
                quota_type,
                limit: self.limit,
                current: self.current,
            })
        }
    }
}

/// Locks the tenant row and fails if the limit is reached
///
/// Must run inside the transaction that performs the insert.
///
/// # Errors
///
/// Returns [`QuotaError::LimitExceeded`] when `current >= limit`.
pub async fn enforce(
    conn: &mut PgConnection,
    tenant_id: Uuid,
    quota_type: QuotaType,
) -> Result<QuotaCheckResult, QuotaError> {
    let tenant = Tenant::lock_for_update(&mut *conn, tenant_id)
        .await?
        .ok_or(QuotaError::TenantNotFound(tenant_id))?;

    let result = evaluate(conn, &tenant, quota_type).await?;

    if !result.allowed {
        tracing::info!(
            tenant_id = %tenant_id,
            quota = quota_type.as_str(),
            current = result.current,
            limit = result.limit,
            "Subscription limit reached"
        );
    }

    result.into_result(quota_type)
}

async fn evaluate(
    conn: &mut PgConnection,
    tenant: &Tenant,
    quota_type: QuotaType,
) -> Result<QuotaCheckResult, QuotaError> {
    let current = match quota_type {
        QuotaType::Users => User::count_by_tenant(&mut *conn, tenant.id).await?,
        QuotaType::Projects => Project::count_by_tenant(&mut *conn, tenant.id).await?,
    };

    let limit = QuotaLimits::from_tenant(tenant).get(quota_type);
    Ok(QuotaCheckResult::evaluate(current, limit))
}
