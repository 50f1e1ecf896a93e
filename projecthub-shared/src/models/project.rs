/// Project model and database operations
///
/// A project has exactly one owner, fixed at creation, and a set of
/// members granted access at creation time. The owner is never stored as a
/// member.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid, member: Uuid) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Website".to_string(),
///     description: None,
///     owner_id: owner,
///     member_ids: vec![member],
/// }).await?;
///
/// let visible = Project::list_for_user(&pool, member).await?;
/// assert!(visible.iter().any(|p| p.project.id == project.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project with its member ids
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,

    /// Creator; never transferred
    pub owner_id: Uuid,

    /// Members other than the owner, ordered by join time then id
    pub member_ids: Vec<Uuid>,

    pub created_at: DateTime<Utc>,
}

/// Project row annotated with its task count
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectWithTaskCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,

    pub task_count: i64,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,

    /// Resolved member ids; the owner and duplicates are dropped on insert
    pub member_ids: Vec<Uuid>,
}

impl Project {
    /// True if `user_id` is the owner
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// True if `user_id` is in the member set
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }

    /// Owner followed by members
    pub fn participant_ids(&self) -> Vec<Uuid> {
        std::iter::once(self.owner_id)
            .chain(self.member_ids.iter().copied())
            .collect()
    }
}

/// Removes the owner and repeated ids while keeping first-seen order
pub fn normalize_member_ids(owner_id: Uuid, member_ids: &[Uuid]) -> Vec<Uuid> {
    let mut members: Vec<Uuid> = Vec::with_capacity(member_ids.len());
    for &id in member_ids {
        if id != owner_id && !members.contains(&id) {
            members.push(id);
        }
    }
    members
}

impl Project {
    /// Inserts the project and its member rows in one transaction
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let members = normalize_member_ids(data.owner_id, &data.member_ids);

        let mut tx = pool.begin().await?;

        let (id, created_at): (Uuid, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO projects (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        for member_id in &members {
            sqlx::query("INSERT INTO project_members (project_id, user_id) VALUES ($1, $2)")
                .bind(id)
                .bind(member_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Self {
            id,
            name: data.name,
            description: data.description,
            owner_id: data.owner_id,
            member_ids: members,
            created_at,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.owner_id, p.created_at,
                   ARRAY(
                       SELECT m.user_id FROM project_members m
                       WHERE m.project_id = p.id
                       ORDER BY m.created_at, m.user_id
                   ) AS member_ids
            FROM projects p
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Projects the user owns or is a member of, each with its task count
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ProjectWithTaskCount>, sqlx::Error> {
        let projects = sqlx::query_as::<_, ProjectWithTaskCount>(
            r#"
            SELECT p.id, p.name, p.description, p.owner_id, p.created_at,
                   ARRAY(
                       SELECT m.user_id FROM project_members m
                       WHERE m.project_id = p.id
                       ORDER BY m.created_at, m.user_id
                   ) AS member_ids,
                   (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS task_count
            FROM projects p
            WHERE p.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM project_members m
                   WHERE m.project_id = p.id AND m.user_id = $1
               )
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }
}
