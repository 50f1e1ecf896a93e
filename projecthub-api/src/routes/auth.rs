/// Authentication endpoints
///
/// - `POST /api/auth/register` - Create an account and get a token
/// - `POST /api/auth/login` - Exchange username and password for a token
///
/// Tokens are valid for 24 hours and cannot be refreshed; clients log in
/// again when one expires.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Json};
use projecthub_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User, UserSummary},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body of both register and login responses
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    let claims = jwt::Claims::new(user.id, user.username.clone());
    Ok(jwt::create_token(&claims, state.jwt_secret())?)
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
/// {"username": "alice", "email": "alice@example.com", "password": "..."}
/// ```
///
/// # Errors
///
/// - `400`: Validation failed, or the username or email is taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    req.validate()?;

    if User::exists_by_username_or_email(&state.db, &req.username, &req.email).await? {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent registration can still hit the unique constraints here;
    // ApiError::from(sqlx::Error) maps that to the same conflict.
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let token = issue_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "User created successfully".to_string(),
            token,
            user: UserSummary::from(&user),
        }),
    ))
}

/// Log in by username
///
/// Email is not accepted as a login key.
///
/// # Errors
///
/// - `400`: Unknown username or wrong password (same response for both)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(&state, &user)?;

    Ok(Json(SessionResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary::from(&user),
    }))
}
