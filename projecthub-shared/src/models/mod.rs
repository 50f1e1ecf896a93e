/// Database models for ProjectHub
///
/// Each model exposes associated async functions taking a `&PgPool`.
///
/// # Models
///
/// - `user`: Accounts and the member lookup helper
/// - `project`: Projects with owner and member set
/// - `task`: Board tasks
/// - `comment`: Append-only task comments
/// - `notification`: Per-user notification queue

pub mod comment;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;
