/// Access rules for projects and tasks
///
/// # Rules
///
/// 1. A user may access a project iff they own it or are in its member set.
/// 2. A user may access a task iff they may access the task's project.
/// 3. Only the task's creator may edit it.
/// 4. Any user who may access the project may delete its tasks.
///
/// The predicates are pure functions over loaded values. The `load_*`
/// helpers fetch the entity first and report "not found" before "access
/// denied"; they never write.
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::auth::authorization::{load_accessible_task, require_task_edit};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, task_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let (task, _project) = load_accessible_task(&pool, task_id, user_id).await?;
/// require_task_edit(user_id, &task)?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{project::Project, task::Task};

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    #[error("Project not found")]
    ProjectNotFound,

    #[error("Task not found")]
    TaskNotFound,

    #[error("Access denied")]
    AccessDenied,

    #[error("Only the user who created this task can edit it.")]
    EditForbidden,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

pub fn can_access_project(user_id: Uuid, project: &Project) -> bool {
    project.is_owner(user_id) || project.is_member(user_id)
}

/// Tasks are reached through their project
pub fn can_access_task(user_id: Uuid, project: &Project) -> bool {
    can_access_project(user_id, project)
}

pub fn can_edit_task(user_id: Uuid, task: &Task) -> bool {
    task.created_by == user_id
}

pub fn can_delete_task(user_id: Uuid, project: &Project) -> bool {
    can_access_project(user_id, project)
}

pub fn require_project_access(user_id: Uuid, project: &Project) -> Result<(), AuthzError> {
    if can_access_project(user_id, project) {
        Ok(())
    } else {
        Err(AuthzError::AccessDenied)
    }
}

pub fn require_task_edit(user_id: Uuid, task: &Task) -> Result<(), AuthzError> {
    if can_edit_task(user_id, task) {
        Ok(())
    } else {
        Err(AuthzError::EditForbidden)
    }
}

pub fn require_task_delete(user_id: Uuid, project: &Project) -> Result<(), AuthzError> {
    if can_delete_task(user_id, project) {
        Ok(())
    } else {
        Err(AuthzError::AccessDenied)
    }
}

/// Loads a project the user may access
pub async fn load_accessible_project(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Project, AuthzError> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(AuthzError::ProjectNotFound)?;

    require_project_access(user_id, &project)?;

    Ok(project)
}

/// Loads a task and its project, checking access through the project
pub async fn load_accessible_task(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<(Task, Project), AuthzError> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(AuthzError::TaskNotFound)?;

    let project = Project::find_by_id(pool, task.project_id)
        .await?
        .ok_or(AuthzError::ProjectNotFound)?;

    if !can_access_task(user_id, &project) {
        return Err(AuthzError::AccessDenied);
    }

    Ok((task, project))
}

/// Loads a task addressed as `/projects/:project_id/tasks/:task_id`
///
/// A task that belongs to another project is reported as not found.
pub async fn load_project_task(
    pool: &PgPool,
    project_id: Uuid,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<(Task, Project), AuthzError> {
    let project = load_accessible_project(pool, project_id, user_id).await?;

    let task = Task::find_by_id(pool, task_id)
        .await?
        .filter(|t| t.project_id == project.id)
        .ok_or(AuthzError::TaskNotFound)?;

    Ok((task, project))
}
