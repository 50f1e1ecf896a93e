/// Comment model and database operations
///
/// Comments are append-only: there is no edit or delete operation. They
/// are removed only together with their task (see [`Task::delete`]).
///
/// [`Task::delete`]: crate::models::task::Task::delete
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     text TEXT NOT NULL,
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub text: String,
    pub task_id: Uuid,
    pub author_id: Uuid,
}

impl Comment {
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (text, task_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, text, task_id, author_id, created_at
            "#,
        )
        .bind(data.text)
        .bind(data.task_id)
        .bind(data.author_id)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Comments on a task, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, text, task_id, author_id, created_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    pub async fn count_by_task(pool: &PgPool, task_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
