/// Comment endpoints
///
/// - `GET /api/tasks/:id/comments` - Comments on a task, oldest first
/// - `POST /api/tasks/:id/comments` - Add a comment
///
/// Access is checked through the task's project.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    routes::views::CommentView,
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use projecthub_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        comment::{Comment, CreateComment},
        user::User,
    },
    notifications::fanout,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub text: String,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let (task, _project) = authorization::load_accessible_task(&state.db, task_id, auth.user_id).await?;

    let comments = Comment::list_by_task(&state.db, task.id).await?;

    let mut author_ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let users = User::summaries_by_ids(&state.db, &author_ids).await?;

    Ok(Json(
        comments
            .into_iter()
            .map(|c| CommentView::new(c, &users))
            .collect(),
    ))
}

/// Add a comment as the caller
///
/// Notifies the task's assignee and creator, skipping the commenter and
/// never notifying the same user twice.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
    body: Result<ApiJson<CreateCommentRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let (task, _project) = authorization::load_accessible_task(&state.db, task_id, auth.user_id).await?;

    let ApiJson(req) = body?;
    req.validate()?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            text: req.text,
            task_id: task.id,
            author_id: auth.user_id,
        },
    )
    .await?;

    tracing::info!(comment_id = %comment.id, task_id = %task.id, "Comment added");

    fanout::deliver(
        &state.db,
        fanout::comment_added(auth.user_id, &auth.username, &task),
    )
    .await;

    let users = User::summaries_by_ids(&state.db, &[auth.user_id]).await?;

    Ok((StatusCode::CREATED, Json(CommentView::new(comment, &users))))
}
