/// Response bodies with user references expanded
///
/// Stored rows carry user ids; responses replace them with
/// [`UserSummary`] objects. A referenced id missing from the lookup
/// becomes `null` (or is left out of `members`).

use chrono::{DateTime, Utc};
use projecthub_shared::models::{
    comment::Comment,
    project::Project,
    task::{Task, TaskPriority, TaskStatus},
    user::UserSummary,
};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

pub type UserLookup = HashMap<Uuid, UserSummary>;

/// `{"message": "..."}` body for operations with nothing else to return
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<UserSummary>,
    pub members: Vec<UserSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_count: Option<i64>,

    pub created_at: DateTime<Utc>,
}

impl ProjectView {
    pub fn new(project: Project, users: &UserLookup, task_count: Option<i64>) -> Self {
        Self {
            id: project.id,
            owner: users.get(&project.owner_id).cloned(),
            members: project
                .member_ids
                .iter()
                .filter_map(|id| users.get(id).cloned())
                .collect(),
            name: project.name,
            description: project.description,
            task_count,
            created_at: project.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub project_id: Uuid,
    pub assignee: Option<UserSummary>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    pub fn new(task: Task, users: &UserLookup) -> Self {
        Self {
            id: task.id,
            assignee: task.assignee_id.and_then(|id| users.get(&id).cloned()),
            created_by: users.get(&task.created_by).cloned(),
            title: task.title,
            description: task.description,
            project_id: task.project_id,
            status: task.status,
            priority: task.priority,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub text: String,
    pub task_id: Uuid,
    pub author: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(comment: Comment, users: &UserLookup) -> Self {
        Self {
            id: comment.id,
            author: users.get(&comment.author_id).cloned(),
            text: comment.text,
            task_id: comment.task_id,
            created_at: comment.created_at,
        }
    }
}
