/// Project endpoints
///
/// # Endpoints
///
/// - `GET /api/projects` - List the tenant's projects (`?status=&limit=&offset=`)
/// - `POST /api/projects` - Create a project (checked against the plan limit)
/// - `GET /api/projects/:projectId` - Project with task counters
/// - `PUT /api/projects/:projectId` - Partial update (admin)
/// - `DELETE /api/projects/:projectId` - Delete with its tasks (admin)
///
/// For update and delete the role check runs before the lookup, so a
/// non-admin gets 403 whether or not the project exists.

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use tenantboard_shared::{
    auth::{authorization::require_admin, context::AuthContext},
    models::project::{
        CreateProject, Project, ProjectFilter, ProjectStatus, ProjectWithStats, UpdateProject,
    },
    quota::{self, QuotaType},
};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{AppJson, AppPath, AppQuery},
    response::ApiResponse,
};

/// Largest accepted page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Project listing query
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsQuery {
    pub status: Option<ProjectStatus>,

    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: Option<i64>,
}

impl ListProjectsQuery {
    fn into_filter(self) -> ProjectFilter {
        let defaults = ProjectFilter::default();
        ProjectFilter {
            status: self.status,
            limit: self.limit.unwrap_or(defaults.limit).min(MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(defaults.offset),
        }
    }
}

/// Project creation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Project name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<ProjectStatus>,
}

/// Project update request; omitted fields are unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Project name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub status: Option<ProjectStatus>,
}

impl From<UpdateProjectRequest> for UpdateProject {
    fn from(req: UpdateProjectRequest) -> Self {
        UpdateProject {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            status: req.status,
        }
    }
}

pub(crate) fn project_not_found() -> ApiError {
    ApiError::NotFound("Project not found".to_string())
}

/// Lists projects of the caller's tenant, newest first
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
    AppQuery(query): AppQuery<ListProjectsQuery>,
) -> ApiResult<ApiResponse<Vec<ProjectWithStats>>> {
    query.validate()?;

    let projects =
        Project::list_by_tenant(&state.db, auth.tenant_id, &query.into_filter()).await?;

    Ok(ApiResponse::ok(projects))
}

/// Creates a project in the caller's tenant
///
/// The tenant row is locked while the project count is compared against
/// `max_projects`; the insert happens in the same transaction.
///
/// # Errors
///
/// - `403 Forbidden` (`subscription_limit_exceeded`): Limit reached, nothing inserted
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    AppJson(req): AppJson<CreateProjectRequest>,
) -> ApiResult<ApiResponse<Project>> {
    req.validate()?;
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::invalid_field("name", "Project name is required"));
    }

    let mut tx = state.db.begin().await?;
    quota::enforce(&mut tx, auth.tenant_id, QuotaType::Projects).await?;

    let project = Project::create(
        &mut *tx,
        CreateProject {
            tenant_id: auth.tenant_id,
            name,
            description: req.description,
            status: req.status,
            created_by: Some(auth.user_id),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        tenant_id = %auth.tenant_id,
        project_id = %project.id,
        user_id = %auth.user_id,
        "Project created"
    );

    Ok(ApiResponse::created(project).with_message("Project created successfully"))
}

/// Fetches one project of the caller's tenant
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(project_id): AppPath<Uuid>,
) -> ApiResult<ApiResponse<ProjectWithStats>> {
    let project = Project::find_with_stats(&state.db, project_id, auth.tenant_id)
        .await?
        .ok_or_else(project_not_found)?;

    Ok(ApiResponse::ok(project))
}

/// Updates a project (admin only)
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(project_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateProjectRequest>,
) -> ApiResult<ApiResponse<Project>> {
    require_admin(&auth)?;
    req.validate()?;

    let changes = UpdateProject::from(req);
    if changes.name.as_deref() == Some("") {
        return Err(ApiError::invalid_field("name", "Project name is required"));
    }
    if changes.is_empty() {
        // Nothing to write; still answer 404 for a foreign or missing id
        let project = Project::find_by_id_and_tenant(&state.db, project_id, auth.tenant_id)
            .await?
            .ok_or_else(project_not_found)?;
        return Ok(ApiResponse::ok(project));
    }

    let project = Project::update(&state.db, project_id, auth.tenant_id, changes)
        .await?
        .ok_or_else(project_not_found)?;

    tracing::info!(
        tenant_id = %auth.tenant_id,
        project_id = %project.id,
        user_id = %auth.user_id,
        "Project updated"
    );

    Ok(ApiResponse::ok(project).with_message("Project updated successfully"))
}

/// Deletes a project and its tasks (admin only)
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(project_id): AppPath<Uuid>,
) -> ApiResult<ApiResponse<Option<()>>> {
    require_admin(&auth)?;

    if !Project::delete(&state.db, project_id, auth.tenant_id).await? {
        return Err(project_not_found());
    }

    tracing::info!(
        tenant_id = %auth.tenant_id,
        project_id = %project_id,
        user_id = %auth.user_id,
        "Project deleted"
    );

    Ok(ApiResponse::ok(None).with_message("Project deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let filter = ListProjectsQuery::default().into_filter();
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.offset, 0);
        assert!(filter.status.is_none());
    }

    #[test]
    fn test_list_query_bounds() {
        let query = ListProjectsQuery {
            limit: Some(500),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = ListProjectsQuery {
            offset: Some(-1),
            ..Default::default()
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_update_request_trims_name() {
        let req: UpdateProjectRequest =
            serde_json::from_str(r#"{"name":"  Renamed  ","status":"archived"}"#).unwrap();
        let changes = UpdateProject::from(req);

        assert_eq!(changes.name.as_deref(), Some("Renamed"));
        assert_eq!(changes.status, Some(ProjectStatus::Archived));
        assert!(changes.description.is_none());
    }

    #[test]
    fn test_empty_update_is_detected() {
        let req: UpdateProjectRequest = serde_json::from_str("{}").unwrap();
        assert!(UpdateProject::from(req).is_empty());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_str::<CreateProjectRequest>(
            r#"{"name":"X","status":"deleted"}"#
        )
        .is_err());
    }
}
