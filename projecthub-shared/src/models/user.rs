/// User model and database operations
///
/// The identity store. Users are created at registration and are never
/// edited or deleted afterwards.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(50) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// if !User::exists_by_username_or_email(&pool, "alice", "alice@example.com").await? {
///     let user = User::create(&pool, CreateUser {
///         username: "alice".to_string(),
///         email: "alice@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     }).await?;
///     println!("Created user: {}", user.id);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Queries shorter than this never reach the database
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

/// Maximum number of users returned by [`User::search`]
pub const SEARCH_RESULT_LIMIT: i64 = 10;

/// User account
///
/// `password_hash` is an Argon2id PHC string and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Unique login name
    pub username: String,

    /// Unique email address, used to resolve project members
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a user (no credentials)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// Builds an `ILIKE` pattern matching `query` as a literal substring
///
/// `%`, `_` and the escape character itself are escaped so user input
/// cannot widen the match.
pub fn substring_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique-constraint violation (`users_username_key` or
    /// `users_email_key`) if the username or email is taken.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username (the only login key)
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact email, used to resolve project members
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Single combined lookup used by registration
    pub async fn exists_by_username_or_email(
        pool: &PgPool,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Case-insensitive substring search on username or email
    ///
    /// Returns an empty list for queries shorter than
    /// [`MIN_SEARCH_QUERY_LEN`] characters and at most
    /// [`SEARCH_RESULT_LIMIT`] results otherwise.
    pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<UserSummary>, sqlx::Error> {
        if query.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username, email
            FROM users
            WHERE username ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\'
            ORDER BY username ASC
            LIMIT $2
            "#,
        )
        .bind(substring_pattern(query))
        .bind(SEARCH_RESULT_LIMIT)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Loads summaries for a set of ids, keyed by id
    ///
    /// Unknown ids are absent from the map.
    pub async fn summaries_by_ids(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserSummary>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, email FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}
