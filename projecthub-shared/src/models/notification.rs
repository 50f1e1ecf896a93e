/// Notification model and database operations
///
/// Notifications are written only by the fanout engine
/// ([`crate::notifications::fanout`]) and afterwards only their `read` flag
/// changes. They are never deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE notification_type AS ENUM (
///     'task_assigned', 'task_updated', 'comment_added', 'project_invitation'
/// );
///
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     message TEXT NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id),
///     kind notification_type NOT NULL,
///     read BOOLEAN NOT NULL DEFAULT FALSE,
///     related_task_id UUID REFERENCES tasks(id) ON DELETE SET NULL,
///     related_project_id UUID REFERENCES projects(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Maximum number of notifications returned by [`Notification::list_recent`]
pub const RECENT_NOTIFICATIONS_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TaskAssigned,
    TaskUpdated,
    CommentAdded,
    ProjectInvitation,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::TaskAssigned => "task_assigned",
            NotificationType::TaskUpdated => "task_updated",
            NotificationType::CommentAdded => "comment_added",
            NotificationType::ProjectInvitation => "project_invitation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,

    /// Recipient
    pub user_id: Uuid,

    #[serde(rename = "type")]
    pub kind: NotificationType,

    pub read: bool,
    pub related_task_id: Option<Uuid>,
    pub related_project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationType,
    pub related_task_id: Option<Uuid>,
    pub related_project_id: Option<Uuid>,
}

impl Notification {
    /// Inserts an unread notification
    pub async fn create(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, title, message, kind, related_task_id, related_project_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, message, user_id, kind, read, related_task_id,
                      related_project_id, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.message)
        .bind(data.kind)
        .bind(data.related_task_id)
        .bind(data.related_project_id)
        .fetch_one(pool)
        .await?;

        Ok(notification)
    }

    /// The user's newest notifications, newest first
    pub async fn list_recent(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, title, message, user_id, kind, read, related_task_id,
                   related_project_id, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(RECENT_NOTIFICATIONS_LIMIT)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    /// Marks one of the user's notifications as read
    ///
    /// Returns `None` if the notification does not exist or belongs to
    /// another user.
    pub async fn mark_read(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING id, title, message, user_id, kind, read, related_task_id,
                      related_project_id, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(notification)
    }

    /// Marks every unread notification of the user as read
    ///
    /// Returns the number of notifications changed.
    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
