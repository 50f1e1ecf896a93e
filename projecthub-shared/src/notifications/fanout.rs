/// Notification fanout
///
/// Fanout runs in two steps. The planning functions ([`project_created`],
/// [`task_created`], [`task_updated`], [`comment_added`]) are pure: they look
/// at the mutation that just happened and return the notifications it
/// implies. [`deliver`] then writes them through a [`NotificationSink`].
///
/// Delivery happens after the triggering write has been committed. A failed
/// notification write is logged and skipped; it never fails the request.
/// Nothing is deduplicated across calls.
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::models::task::Task;
/// use projecthub_shared::notifications::fanout;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, actor: Uuid, task: Task) {
/// let pending = fanout::task_created(actor, &task);
/// let stored = fanout::deliver(&pool, pending).await;
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    notification::{CreateNotification, Notification, NotificationType},
    project::Project,
    task::Task,
};

/// A notification planned but not yet stored
pub type PendingNotification = CreateNotification;

/// Destination for planned notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn store(&self, notification: PendingNotification) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl NotificationSink for PgPool {
    async fn store(&self, notification: PendingNotification) -> Result<(), sqlx::Error> {
        Notification::create(self, notification).await.map(|_| ())
    }
}

/// Invitations for every member of a new project except the owner
pub fn project_created(project: &Project) -> Vec<PendingNotification> {
    project
        .member_ids
        .iter()
        .filter(|&&member| member != project.owner_id)
        .map(|&member| PendingNotification {
            user_id: member,
            title: "Project Invitation".to_string(),
            message: format!("You've been added to project: {}", project.name),
            kind: NotificationType::ProjectInvitation,
            related_task_id: None,
            related_project_id: Some(project.id),
        })
        .collect()
}

/// Assignment notice for a new task, unless the creator assigned themselves
pub fn task_created(actor_id: Uuid, task: &Task) -> Vec<PendingNotification> {
    match task.assignee_id {
        Some(assignee) if assignee != actor_id => vec![PendingNotification {
            user_id: assignee,
            title: "Task Assigned".to_string(),
            message: format!("You've been assigned a new task: {}", task.title),
            kind: NotificationType::TaskAssigned,
            related_task_id: Some(task.id),
            related_project_id: Some(task.project_id),
        }],
        _ => Vec::new(),
    }
}

/// Notifications for a task edit
///
/// A changed, non-empty assignee notifies the new assignee, including when
/// that is the editor. A status change notifies the previous assignee, if
/// there was one. Both may fire.
pub fn task_updated(before: &Task, after: &Task) -> Vec<PendingNotification> {
    let mut pending = Vec::new();

    if let Some(assignee) = after.assignee_id {
        if before.assignee_id != Some(assignee) {
            pending.push(PendingNotification {
                user_id: assignee,
                title: "Task Updated".to_string(),
                message: format!("You've been assigned to task: {}", after.title),
                kind: NotificationType::TaskAssigned,
                related_task_id: Some(after.id),
                related_project_id: Some(after.project_id),
            });
        }
    }

    if before.status != after.status {
        if let Some(previous) = before.assignee_id {
            pending.push(PendingNotification {
                user_id: previous,
                title: "Task Status Updated".to_string(),
                message: format!("Task \"{}\" status changed to {}", after.title, after.status),
                kind: NotificationType::TaskUpdated,
                related_task_id: Some(after.id),
                related_project_id: Some(after.project_id),
            });
        }
    }

    pending
}

/// Comment notices for the task's assignee and creator, never the commenter
pub fn comment_added(commenter_id: Uuid, commenter_name: &str, task: &Task) -> Vec<PendingNotification> {
    let notice = |user_id: Uuid| PendingNotification {
        user_id,
        title: "New Comment".to_string(),
        message: format!("{} commented on task: {}", commenter_name, task.title),
        kind: NotificationType::CommentAdded,
        related_task_id: Some(task.id),
        related_project_id: Some(task.project_id),
    };

    let mut pending = Vec::new();

    if let Some(assignee) = task.assignee_id {
        if assignee != commenter_id {
            pending.push(notice(assignee));
        }
    }

    if task.created_by != commenter_id && Some(task.created_by) != task.assignee_id {
        pending.push(notice(task.created_by));
    }

    pending
}

/// Stores each pending notification, skipping the ones that fail
///
/// Returns how many were stored.
pub async fn deliver<S>(sink: &S, pending: Vec<PendingNotification>) -> usize
where
    S: NotificationSink + ?Sized,
{
    let mut stored = 0;

    for notification in pending {
        let recipient = notification.user_id;
        let kind = notification.kind;

        match sink.store(notification).await {
            Ok(()) => stored += 1,
            Err(e) => {
                tracing::warn!(
                    user_id = %recipient,
                    kind = kind.as_str(),
                    error = %e,
                    "Failed to store notification"
                );
            }
        }
    }

    stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        stored: Mutex<Vec<PendingNotification>>,
        fail_for: Option<Uuid>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn store(&self, notification: PendingNotification) -> Result<(), sqlx::Error> {
            if self.fail_for == Some(notification.user_id) {
                return Err(sqlx::Error::PoolTimedOut);
            }
            self.stored.lock().unwrap().push(notification);
            Ok(())
        }
    }

    fn project(owner: Uuid, members: Vec<Uuid>) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Apollo".to_string(),
            description: None,
            owner_id: owner,
            member_ids: members,
            created_at: Utc::now(),
        }
    }

    fn task(created_by: Uuid, assignee: Option<Uuid>, status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Fix login".to_string(),
            description: None,
            project_id: Uuid::new_v4(),
            assignee_id: assignee,
            status,
            priority: TaskPriority::Medium,
            created_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn edited(before: &Task, assignee: Option<Uuid>, status: TaskStatus) -> Task {
        Task {
            assignee_id: assignee,
            status,
            ..before.clone()
        }
    }

    #[test]
    fn test_project_invites_members_not_owner() {
        let owner = Uuid::new_v4();
        let a = Uuid::new_v4();
        let p = project(owner, vec![a]);

        let pending = project_created(&p);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, a);
        assert_eq!(pending[0].kind, NotificationType::ProjectInvitation);
        assert_eq!(pending[0].title, "Project Invitation");
        assert_eq!(pending[0].message, "You've been added to project: Apollo");
        assert_eq!(pending[0].related_project_id, Some(p.id));
        assert_eq!(pending[0].related_task_id, None);
    }

    #[test]
    fn test_project_without_members_notifies_nobody() {
        let owner = Uuid::new_v4();
        assert!(project_created(&project(owner, vec![])).is_empty());
        assert!(project_created(&project(owner, vec![owner])).is_empty());
    }

    #[test]
    fn test_task_created_notifies_other_assignee() {
        let actor = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let t = task(actor, Some(assignee), TaskStatus::Todo);

        let pending = task_created(actor, &t);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, assignee);
        assert_eq!(pending[0].kind, NotificationType::TaskAssigned);
        assert_eq!(pending[0].message, "You've been assigned a new task: Fix login");
        assert_eq!(pending[0].related_task_id, Some(t.id));
        assert_eq!(pending[0].related_project_id, Some(t.project_id));
    }

    #[test]
    fn test_task_created_self_or_unassigned_is_silent() {
        let actor = Uuid::new_v4();
        assert!(task_created(actor, &task(actor, Some(actor), TaskStatus::Todo)).is_empty());
        assert!(task_created(actor, &task(actor, None, TaskStatus::Todo)).is_empty());
    }

    #[test]
    fn test_update_new_assignee_then_status_change() {
        let creator = Uuid::new_v4();
        let u1 = Uuid::new_v4();

        let v0 = task(creator, None, TaskStatus::Todo);
        let v1 = edited(&v0, Some(u1), TaskStatus::Todo);
        let pending = task_updated(&v0, &v1);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, u1);
        assert_eq!(pending[0].kind, NotificationType::TaskAssigned);
        assert_eq!(pending[0].title, "Task Updated");

        let v2 = edited(&v1, Some(u1), TaskStatus::Done);
        let pending = task_updated(&v1, &v2);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, u1);
        assert_eq!(pending[0].kind, NotificationType::TaskUpdated);
        assert_eq!(pending[0].message, "Task \"Fix login\" status changed to done");
    }

    #[test]
    fn test_update_status_change_goes_to_previous_assignee() {
        let creator = Uuid::new_v4();
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();

        let before = task(creator, Some(u1), TaskStatus::Todo);
        let after = edited(&before, Some(u2), TaskStatus::InProgress);

        let pending = task_updated(&before, &after);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].user_id, u2);
        assert_eq!(pending[0].kind, NotificationType::TaskAssigned);
        assert_eq!(pending[1].user_id, u1);
        assert_eq!(pending[1].kind, NotificationType::TaskUpdated);
    }

    #[test]
    fn test_update_self_assignment_still_notifies() {
        let creator = Uuid::new_v4();
        let before = task(creator, None, TaskStatus::Todo);
        let after = edited(&before, Some(creator), TaskStatus::Todo);

        let pending = task_updated(&before, &after);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, creator);
    }

    #[test]
    fn test_update_without_changes_or_prior_assignee_is_silent() {
        let creator = Uuid::new_v4();
        let u1 = Uuid::new_v4();

        let same = task(creator, Some(u1), TaskStatus::Todo);
        assert!(task_updated(&same, &same.clone()).is_empty());

        // Status change with nobody previously assigned
        let before = task(creator, None, TaskStatus::Todo);
        let after = edited(&before, None, TaskStatus::Done);
        assert!(task_updated(&before, &after).is_empty());

        // Clearing the assignee
        let before = task(creator, Some(u1), TaskStatus::Todo);
        let after = edited(&before, None, TaskStatus::Todo);
        assert!(task_updated(&before, &after).is_empty());
    }

    #[test]
    fn test_comment_by_unassigned_creator_is_silent() {
        let creator = Uuid::new_v4();
        let t = task(creator, None, TaskStatus::Todo);
        assert!(comment_added(creator, "alice", &t).is_empty());
    }

    #[test]
    fn test_comment_notifies_assignee_and_creator() {
        let creator = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let commenter = Uuid::new_v4();
        let t = task(creator, Some(assignee), TaskStatus::Todo);

        let pending = comment_added(commenter, "dave", &t);
        let recipients: Vec<Uuid> = pending.iter().map(|n| n.user_id).collect();
        assert_eq!(recipients, vec![assignee, creator]);
        assert!(pending.iter().all(|n| n.kind == NotificationType::CommentAdded));
        assert_eq!(pending[0].message, "dave commented on task: Fix login");
    }

    #[test]
    fn test_comment_creator_who_is_assignee_notified_once() {
        let creator = Uuid::new_v4();
        let commenter = Uuid::new_v4();
        let t = task(creator, Some(creator), TaskStatus::Todo);

        let pending = comment_added(commenter, "erin", &t);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, creator);
    }

    #[test]
    fn test_comment_by_assignee_notifies_creator_only() {
        let creator = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let t = task(creator, Some(assignee), TaskStatus::Todo);

        let pending = comment_added(assignee, "frank", &t);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, creator);
    }

    #[tokio::test]
    async fn test_deliver_stores_all() {
        let sink = RecordingSink::default();
        let p = project(Uuid::new_v4(), vec![Uuid::new_v4(), Uuid::new_v4()]);

        let stored = deliver(&sink, project_created(&p)).await;
        assert_eq!(stored, 2);
        assert_eq!(sink.stored.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_deliver_skips_failures() {
        let bad = Uuid::new_v4();
        let good = Uuid::new_v4();
        let sink = RecordingSink {
            fail_for: Some(bad),
            ..Default::default()
        };
        let p = project(Uuid::new_v4(), vec![bad, good]);

        let stored = deliver(&sink, project_created(&p)).await;
        assert_eq!(stored, 1);

        let recorded = sink.stored.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].user_id, good);
    }

    #[tokio::test]
    async fn test_deliver_nothing() {
        let sink = RecordingSink::default();
        assert_eq!(deliver(&sink, Vec::new()).await, 0);
    }
}
