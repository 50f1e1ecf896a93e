/// User search, used by clients to pick project members
///
/// ```text
/// GET /api/users/search?query=ali
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Json,
};
use projecthub_shared::models::user::{User, UserSummary};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// Up to 10 users whose username or email contains `query`
///
/// A missing or one-character query returns `[]`. The query is used as
/// given; surrounding whitespace counts toward the length and the match.
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let query = params.query.unwrap_or_default();
    let users = User::search(&state.db, &query).await?;

    Ok(Json(users))
}
