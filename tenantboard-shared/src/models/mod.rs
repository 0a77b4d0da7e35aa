/// Database models for TenantBoard
///
/// Every tenant-scoped query takes the tenant id as an explicit argument and
/// binds it into the statement. Callers resolve that id from the
/// authenticated session, never from client input.
///
/// Query functions are generic over `sqlx::PgExecutor` so they run the same
/// against the pool or inside a transaction.
///
/// # Models
///
/// - `tenant`: Customer organizations and their subscription limits
/// - `user`: Accounts belonging to exactly one tenant
/// - `project`: Tenant-owned projects
/// - `task`: Kanban tasks nested under a project of the same tenant
///
/// # Example
///
/// ```no_run
/// use tenantboard_shared::models::project::{Project, ProjectFilter};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, tenant_id: Uuid) -> Result<(), sqlx::Error> {
/// let projects = Project::list_by_tenant(&pool, tenant_id, &ProjectFilter::default()).await?;
/// assert!(projects.iter().all(|p| p.project.tenant_id == tenant_id));
/// # Ok(())
/// # }
/// ```

pub mod project;
pub mod task;
pub mod tenant;
pub mod user;
