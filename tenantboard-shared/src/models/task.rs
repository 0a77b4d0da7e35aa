/// Task model and database operations
///
/// Tasks are kanban cards nested under a project. A task carries both its
/// `project_id` and its `tenant_id`, and the composite foreign key
/// `(project_id, tenant_id) -> projects (id, tenant_id)` guarantees the two
/// always agree.
///
/// # Status transitions
///
/// ```text
/// todo <-> in_progress <-> completed
/// ```
///
/// Any status may be set directly; the board UI moves cards freely.
///
/// # Example
///
/// ```no_run
/// use tenantboard_shared::models::task::{CreateTask, Task, TaskStatus};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, tenant_id: Uuid, project_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(
///     &pool,
///     CreateTask {
///         project_id,
///         tenant_id,
///         title: "Write release notes".to_string(),
///         ..Default::default()
///     },
/// )
/// .await?;
///
/// Task::update_status(&pool, task.id, tenant_id, TaskStatus::InProgress).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Composite foreign key tying a task to a project of the same tenant
pub const PROJECT_CONSTRAINT: &str = "tasks_project_tenant_fkey";

/// Kanban column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

/// Task within a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,

    /// Assignee; always a user of the same tenant
    pub assigned_to: Option<Uuid>,

    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

/// Partial task update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
            && self.due_date.is_none()
    }
}

/// Listing filter
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
}

const TASK_COLUMNS: &str = "id, project_id, tenant_id, title, description, status, priority, \
                            assigned_to, due_date, created_at, updated_at";

impl Task {
    /// Inserts a task
    ///
    /// The caller must have verified that the project belongs to the tenant;
    /// the composite foreign key rejects a mismatch regardless.
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (project_id, tenant_id, title, description, status, priority,
                               assigned_to, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.project_id)
        .bind(data.tenant_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status.unwrap_or_default())
        .bind(data.priority.unwrap_or_default())
        .bind(data.assigned_to)
        .bind(data.due_date)
        .fetch_one(executor)
        .await
    }

    /// Finds a task by ID within a tenant
    pub async fn find_by_id_and_tenant<'e, E>(
        executor: E,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists tasks of one project, highest priority and nearest due date first
    pub async fn list_by_project<'e, E>(
        executor: E,
        project_id: Uuid,
        tenant_id: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE project_id = $1
              AND tenant_id = $2
              AND ($3::task_status IS NULL OR status = $3)
              AND ($4::task_priority IS NULL OR priority = $4)
              AND ($5::uuid IS NULL OR assigned_to = $5)
            ORDER BY priority DESC, due_date ASC NULLS LAST, created_at ASC
            "#
        ))
        .bind(project_id)
        .bind(tenant_id)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(filter.assigned_to)
        .fetch_all(executor)
        .await
    }

    /// Applies a partial update
    ///
    /// Returns `None` if the task does not exist in this tenant.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        tenant_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        // $1 = id, $2 = tenant_id
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND tenant_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(tenant_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        q.fetch_optional(executor).await
    }

    /// Moves a task to another kanban column
    ///
    /// Touches only `status` and `updated_at`.
    pub async fn update_status<'e, E>(
        executor: E,
        id: Uuid,
        tenant_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(tenant_id)
        .bind(status)
        .fetch_optional(executor)
        .await
    }

    /// Deletes a task
    ///
    /// Returns `false` if the task does not exist in this tenant.
    pub async fn delete<'e, E>(executor: E, id: Uuid, tenant_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
