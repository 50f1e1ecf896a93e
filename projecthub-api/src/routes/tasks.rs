/// Task endpoints, nested under a project
///
/// - `GET /api/projects/:id/tasks` - Tasks of the project, newest first
/// - `POST /api/projects/:id/tasks` - Create a task
/// - `PUT /api/projects/:id/tasks/:task_id` - Replace a task (creator only)
/// - `DELETE /api/projects/:id/tasks/:task_id` - Delete a task and its comments
///
/// All four require the caller to own or belong to the project. A task id
/// that belongs to a different project answers 404. Access is checked
/// before the request body is parsed or validated.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    routes::views::{MessageResponse, TaskView},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use projecthub_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        comment::Comment,
        task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
        user::User,
    },
    notifications::fanout,
};
use serde::{Deserialize, Deserializer};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Accepts a UUID, `null`, a missing field or `""` (treated as no assignee)
fn optional_user_id<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => Uuid::parse_str(id).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Body of both create and update
///
/// Omitted `status` and `priority` fall back to `todo` and `medium`; an
/// omitted `assignee` means unassigned. On update this replaces every
/// field, so omitting a field resets it.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    #[validate(length(min = 1, max = 255, message = "Task title must be 1-255 characters"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default, alias = "assignee_id", deserialize_with = "optional_user_id")]
    pub assignee: Option<Uuid>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskRequest {
    fn effective_status(&self) -> TaskStatus {
        self.status.unwrap_or_default()
    }

    fn effective_priority(&self) -> TaskPriority {
        self.priority.unwrap_or_default()
    }
}

async fn ensure_assignee_exists(pool: &PgPool, assignee: Option<Uuid>) -> ApiResult<()> {
    if let Some(id) = assignee {
        if User::find_by_id(pool, id).await?.is_none() {
            return Err(ApiError::BadRequest("Assignee not found".to_string()));
        }
    }
    Ok(())
}

async fn task_view(pool: &PgPool, task: Task) -> ApiResult<TaskView> {
    let users = User::summaries_by_ids(pool, &task.referenced_user_ids()).await?;
    Ok(TaskView::new(task, &users))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let project = authorization::load_accessible_project(&state.db, project_id, auth.user_id).await?;

    let tasks = Task::list_by_project(&state.db, project.id).await?;

    let mut user_ids: Vec<Uuid> = tasks.iter().flat_map(Task::referenced_user_ids).collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let users = User::summaries_by_ids(&state.db, &user_ids).await?;

    Ok(Json(tasks.into_iter().map(|t| TaskView::new(t, &users)).collect()))
}

/// Create a task in the project
///
/// ```text
/// POST /api/projects/:id/tasks
/// {"title": "Draft copy", "assignee": "<user id>", "priority": "high"}
/// ```
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    body: Result<ApiJson<TaskRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    let project = authorization::load_accessible_project(&state.db, project_id, auth.user_id).await?;

    let ApiJson(req) = body?;
    req.validate()?;
    ensure_assignee_exists(&state.db, req.assignee).await?;

    let status = req.effective_status();
    let priority = req.effective_priority();

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            project_id: project.id,
            assignee_id: req.assignee,
            status,
            priority,
            created_by: auth.user_id,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, project_id = %project.id, "Task created");

    fanout::deliver(&state.db, fanout::task_created(auth.user_id, &task)).await;

    Ok((StatusCode::CREATED, Json(task_view(&state.db, task).await?)))
}

/// Replace a task's editable fields
///
/// # Errors
///
/// - `400`: Malformed or invalid body, once access has been granted
/// - `403`: Caller is not a participant, or did not create the task
/// - `404`: Project or task not found
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id)): ApiPath<(Uuid, Uuid)>,
    body: Result<ApiJson<TaskRequest>, ApiError>,
) -> ApiResult<Json<TaskView>> {
    let (before, _project) =
        authorization::load_project_task(&state.db, project_id, task_id, auth.user_id).await?;
    authorization::require_task_edit(auth.user_id, &before)?;

    let ApiJson(req) = body?;
    req.validate()?;
    ensure_assignee_exists(&state.db, req.assignee).await?;

    let status = req.effective_status();
    let priority = req.effective_priority();

    let after = Task::update(
        &state.db,
        before.id,
        UpdateTask {
            title: req.title,
            description: req.description,
            assignee_id: req.assignee,
            status,
            priority,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(task_id = %after.id, status = %after.status, "Task updated");

    fanout::deliver(&state.db, fanout::task_updated(&before, &after)).await;

    Ok(Json(task_view(&state.db, after).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, task_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    let (task, project) =
        authorization::load_project_task(&state.db, project_id, task_id, auth.user_id).await?;
    authorization::require_task_delete(auth.user_id, &project)?;

    let comments = Comment::count_by_task(&state.db, task.id).await?;

    if !Task::delete(&state.db, task.id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = %task.id, deleted_by = %auth.user_id, comments, "Task deleted");

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}
