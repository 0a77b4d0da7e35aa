/// Task endpoints
///
/// Tasks always live under a project of the same tenant. Listing and
/// creation go through the project path and verify the project first; the
/// task-id routes look the task up by id *and* tenant.
///
/// # Endpoints
///
/// - `GET /api/projects/:projectId/tasks` - List (`?status=&priority=&assignedTo=`)
/// - `POST /api/projects/:projectId/tasks` - Create
/// - `PATCH /api/projects/tasks/:taskId/status` - Move on the board (status only)
/// - `PUT /api/projects/tasks/:taskId` - Partial update
/// - `DELETE /api/projects/tasks/:taskId` - Delete

use axum::extract::State;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use tenantboard_shared::{
    auth::context::AuthContext,
    models::{
        project::Project,
        task::{CreateTask, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTask},
        user::User,
    },
};

use super::projects::project_not_found;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{AppJson, AppPath, AppQuery},
    response::ApiResponse,
};

/// Task listing filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
}

/// Task creation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Task title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    /// Must be a user of the caller's tenant
    pub assigned_to: Option<Uuid>,

    /// `YYYY-MM-DD`
    pub due_date: Option<NaiveDate>,
}

/// Task update request; omitted fields are unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Task title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

/// Status-only update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

fn trimmed_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::invalid_field("title", "Task title is required"));
    }
    Ok(title.to_string())
}

async fn ensure_project(state: &AppState, project_id: Uuid, tenant_id: Uuid) -> ApiResult<()> {
    Project::find_by_id_and_tenant(&state.db, project_id, tenant_id)
        .await?
        .map(|_| ())
        .ok_or_else(project_not_found)
}

/// An assignee of another tenant is a client error, not a 404: the task
/// itself exists
async fn ensure_assignee(state: &AppState, assignee: Option<Uuid>, tenant_id: Uuid) -> ApiResult<()> {
    let Some(user_id) = assignee else {
        return Ok(());
    };

    match User::find_by_id_and_tenant(&state.db, user_id, tenant_id).await? {
        Some(user) if user.is_active => Ok(()),
        Some(_) => Err(ApiError::BadRequest(
            "Assigned user is deactivated".to_string(),
        )),
        None => Err(ApiError::BadRequest(
            "Assigned user does not belong to this tenant".to_string(),
        )),
    }
}

/// Lists tasks of a project, highest priority first
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(project_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<ListTasksQuery>,
) -> ApiResult<ApiResponse<Vec<Task>>> {
    ensure_project(&state, project_id, auth.tenant_id).await?;

    let filter = TaskFilter {
        status: query.status,
        priority: query.priority,
        assigned_to: query.assigned_to,
    };

    let tasks = Task::list_by_project(&state.db, project_id, auth.tenant_id, &filter).await?;
    Ok(ApiResponse::ok(tasks))
}

/// Creates a task under a project of the caller's tenant
///
/// # Errors
///
/// - `400 Bad Request`: Assignee is not an active user of this tenant
/// - `404 Not Found`: Project missing, owned by another tenant, or deleted
///   before the insert
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(project_id): AppPath<Uuid>,
    AppJson(req): AppJson<CreateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    req.validate()?;
    let title = trimmed_title(&req.title)?;

    ensure_project(&state, project_id, auth.tenant_id).await?;
    ensure_assignee(&state, req.assigned_to, auth.tenant_id).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id,
            tenant_id: auth.tenant_id,
            title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            assigned_to: req.assigned_to,
            due_date: req.due_date,
        },
    )
    .await?;

    tracing::info!(
        tenant_id = %auth.tenant_id,
        project_id = %project_id,
        task_id = %task.id,
        user_id = %auth.user_id,
        "Task created"
    );

    Ok(ApiResponse::created(task).with_message("Task created successfully"))
}

/// Changes only the status of a task
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(task_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateTaskStatusRequest>,
) -> ApiResult<ApiResponse<Task>> {
    let task = Task::update_status(&state.db, task_id, auth.tenant_id, req.status)
        .await?
        .ok_or_else(task_not_found)?;

    tracing::info!(
        tenant_id = %auth.tenant_id,
        task_id = %task.id,
        status = task.status.as_str(),
        "Task status updated"
    );

    Ok(ApiResponse::ok(task).with_message("Task status updated successfully"))
}

/// Partially updates a task
///
/// `assignedTo` can be changed but not cleared through this endpoint.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(task_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateTaskRequest>,
) -> ApiResult<ApiResponse<Task>> {
    req.validate()?;
    let title = req.title.as_deref().map(trimmed_title).transpose()?;

    ensure_assignee(&state, req.assigned_to, auth.tenant_id).await?;

    let changes = UpdateTask {
        title,
        description: req.description,
        status: req.status,
        priority: req.priority,
        assigned_to: req.assigned_to,
        due_date: req.due_date,
    };

    let task = if changes.is_empty() {
        Task::find_by_id_and_tenant(&state.db, task_id, auth.tenant_id).await?
    } else {
        Task::update(&state.db, task_id, auth.tenant_id, changes).await?
    }
    .ok_or_else(task_not_found)?;

    tracing::info!(
        tenant_id = %auth.tenant_id,
        task_id = %task.id,
        user_id = %auth.user_id,
        "Task updated"
    );

    Ok(ApiResponse::ok(task).with_message("Task updated successfully"))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(task_id): AppPath<Uuid>,
) -> ApiResult<ApiResponse<Option<()>>> {
    if !Task::delete(&state.db, task_id, auth.tenant_id).await? {
        return Err(task_not_found());
    }

    tracing::info!(
        tenant_id = %auth.tenant_id,
        task_id = %task_id,
        user_id = %auth.user_id,
        "Task deleted"
    );

    Ok(ApiResponse::ok(None).with_message("Task deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_parses_wire_format() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{
                "title": "Draft release notes",
                "status": "in_progress",
                "priority": "high",
                "dueDate": "2025-03-01"
            }"#,
        )
        .unwrap();

        assert_eq!(req.status, Some(TaskStatus::InProgress));
        assert_eq!(req.priority, Some(TaskPriority::High));
        assert_eq!(req.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(req.assigned_to.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_status_request_rejects_unknown_state() {
        assert!(serde_json::from_str::<UpdateTaskStatusRequest>(r#"{"status":"done"}"#).is_err());
        assert!(serde_json::from_str::<UpdateTaskStatusRequest>(r#"{}"#).is_err());

        let req: UpdateTaskStatusRequest =
            serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert_eq!(req.status, TaskStatus::Completed);
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(trimmed_title("   ").is_err());
        assert_eq!(trimmed_title("  Ship it ").unwrap(), "Ship it");
    }

    #[test]
    fn test_invalid_due_date_rejected() {
        assert!(serde_json::from_str::<CreateTaskRequest>(
            r#"{"title":"X","dueDate":"2025-02-30"}"#
        )
        .is_err());
    }
}
