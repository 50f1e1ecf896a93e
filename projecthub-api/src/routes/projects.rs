/// Project endpoints
///
/// - `GET /api/projects` - Projects the caller owns or belongs to
/// - `POST /api/projects` - Create a project, inviting members by email
/// - `GET /api/projects/:id` - One project (owner or member only)
///
/// Membership is fixed at creation; there is no endpoint to add or remove
/// members later.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
    routes::views::ProjectView,
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use projecthub_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        project::{CreateProject, Project},
        user::User,
    },
    notifications::fanout,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Project name must be 1-255 characters"))]
    pub name: String,

    pub description: Option<String>,

    /// Member emails; unknown addresses are skipped
    #[serde(default)]
    pub members: Vec<String>,
}

/// Resolves member emails to user ids, silently dropping unknown ones
async fn resolve_member_emails(pool: &PgPool, emails: &[String]) -> Result<Vec<Uuid>, sqlx::Error> {
    let mut ids = Vec::with_capacity(emails.len());

    for email in emails {
        let email = email.trim();
        if email.is_empty() {
            continue;
        }

        match User::find_by_email(pool, email).await? {
            Some(user) => ids.push(user.id),
            None => tracing::debug!(email, "Skipping unknown member email"),
        }
    }

    Ok(ids)
}

async fn project_view(pool: &PgPool, project: Project, task_count: Option<i64>) -> ApiResult<ProjectView> {
    let users = User::summaries_by_ids(pool, &project.participant_ids()).await?;
    Ok(ProjectView::new(project, &users, task_count))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectView>>> {
    let projects = Project::list_for_user(&state.db, auth.user_id).await?;

    let mut user_ids: Vec<Uuid> = projects
        .iter()
        .flat_map(|p| p.project.participant_ids())
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let users = User::summaries_by_ids(&state.db, &user_ids).await?;

    let views = projects
        .into_iter()
        .map(|p| ProjectView::new(p.project, &users, Some(p.task_count)))
        .collect();

    Ok(Json(views))
}

/// Create a project owned by the caller
///
/// ```text
/// POST /api/projects
/// {"name": "Website", "description": "Relaunch", "members": ["bob@example.com"]}
/// ```
///
/// Every resolved member receives a `project_invitation` notification.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectView>)> {
    req.validate()?;

    let member_ids = resolve_member_emails(&state.db, &req.members).await?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            owner_id: auth.user_id,
            member_ids,
        },
    )
    .await?;

    tracing::info!(
        project_id = %project.id,
        owner_id = %auth.user_id,
        members = project.member_ids.len(),
        "Project created"
    );

    fanout::deliver(&state.db, fanout::project_created(&project)).await;

    let view = project_view(&state.db, project, None).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<ProjectView>> {
    let project = authorization::load_accessible_project(&state.db, project_id, auth.user_id).await?;

    Ok(Json(project_view(&state.db, project, None).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_default_to_empty() {
        let req: CreateProjectRequest = serde_json::from_str(r#"{"name": "Roadmap"}"#).unwrap();
        assert!(req.members.is_empty());
        assert!(req.description.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let req: CreateProjectRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
