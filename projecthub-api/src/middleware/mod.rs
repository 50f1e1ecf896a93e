/// Middleware for the API server
///
/// Bearer authentication lives in `projecthub_shared::auth::middleware`;
/// this module holds the HTTP-only layers.

pub mod security;
