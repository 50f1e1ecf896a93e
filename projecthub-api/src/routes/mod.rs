/// API route handlers, one module per resource
///
/// - `health`: Liveness and database check
/// - `auth`: Register and login
/// - `projects`: Project listing, creation and lookup
/// - `tasks`: Task board operations under a project
/// - `comments`: Task comments
/// - `notifications`: Polling and read flags
/// - `users`: Member search
/// - `views`: Response bodies with user references expanded

pub mod auth;
pub mod comments;
pub mod health;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod views;
