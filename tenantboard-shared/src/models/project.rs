/// Project model and database operations
///
/// Projects always carry the tenant id of their creator's tenant. Every lookup,
/// update and delete filters by `(id, tenant_id)`, so a project of another
/// tenant is indistinguishable from a missing one.
///
/// # Example
///
/// ```no_run
/// use tenantboard_shared::models::project::{CreateProject, Project, UpdateProject, ProjectStatus};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, tenant_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(
///     &pool,
///     CreateProject {
///         tenant_id,
///         name: "Website relaunch".to_string(),
///         description: None,
///         status: None,
///         created_by: Some(user_id),
///     },
/// )
/// .await?;
///
/// let archived = Project::update(
///     &pool,
///     project.id,
///     tenant_id,
///     UpdateProject {
///         status: Some(ProjectStatus::Archived),
///         ..Default::default()
///     },
/// )
/// .await?;
/// assert!(archived.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Archived => "archived",
            ProjectStatus::Completed => "completed",
        }
    }
}

/// Tenant-owned project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,

    /// Creator; cleared if that user is removed
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project with task counters, as returned by listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,

    pub task_count: i64,

    pub completed_task_count: i64,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,

    /// Defaults to `active`
    pub status: Option<ProjectStatus>,

    pub created_by: Option<Uuid>,
}

/// Partial project update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// Listing filter and pagination
#[derive(Debug, Clone, Copy)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            status: None,
            limit: 50,
            offset: 0,
        }
    }
}

const PROJECT_COLUMNS: &str =
    "id, tenant_id, name, description, status, created_by, created_at, updated_at";

impl Project {
    /// Inserts a project
    ///
    /// Subscription limits are not checked here; use
    /// [`quota::enforce`](crate::quota::enforce) in the same transaction.
    pub async fn create<'e, E>(executor: E, data: CreateProject) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (tenant_id, name, description, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(data.tenant_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.status.unwrap_or_default())
        .bind(data.created_by)
        .fetch_one(executor)
        .await
    }

    /// Finds a project by ID within a tenant
    pub async fn find_by_id_and_tenant<'e, E>(
        executor: E,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a project with its task counters within a tenant
    pub async fn find_with_stats<'e, E>(
        executor: E,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<ProjectWithStats>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ProjectWithStats>(
            r#"
            SELECT p.id, p.tenant_id, p.name, p.description, p.status, p.created_by,
                   p.created_at, p.updated_at,
                   COUNT(t.id) AS task_count,
                   COUNT(t.id) FILTER (WHERE t.status = 'completed') AS completed_task_count
            FROM projects p
            LEFT JOIN tasks t ON t.project_id = p.id AND t.tenant_id = p.tenant_id
            WHERE p.id = $1 AND p.tenant_id = $2
            GROUP BY p.id
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists projects of a tenant, newest first
    pub async fn list_by_tenant<'e, E>(
        executor: E,
        tenant_id: Uuid,
        filter: &ProjectFilter,
    ) -> Result<Vec<ProjectWithStats>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ProjectWithStats>(
            r#"
            SELECT p.id, p.tenant_id, p.name, p.description, p.status, p.created_by,
                   p.created_at, p.updated_at,
                   COUNT(t.id) AS task_count,
                   COUNT(t.id) FILTER (WHERE t.status = 'completed') AS completed_task_count
            FROM projects p
            LEFT JOIN tasks t ON t.project_id = p.id AND t.tenant_id = p.tenant_id
            WHERE p.tenant_id = $1
              AND ($2::project_status IS NULL OR p.status = $2)
            GROUP BY p.id
            ORDER BY p.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id)
        .bind(filter.status)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(executor)
        .await
    }

    /// Counts projects of a tenant
    pub async fn count_by_tenant<'e, E>(executor: E, tenant_id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(executor)
            .await
    }

    /// Applies a partial update
    ///
    /// Returns `None` if the project does not exist in this tenant.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        tenant_id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        // $1 = id, $2 = tenant_id
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND tenant_id = $2 RETURNING {PROJECT_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id).bind(tenant_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        q.fetch_optional(executor).await
    }

    /// Deletes a project and, by cascade, its tasks
    ///
    /// Returns `false` if the project does not exist in this tenant.
    pub async fn delete<'e, E>(executor: E, id: Uuid, tenant_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
