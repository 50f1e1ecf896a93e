/// Bearer token authentication for Axum
///
/// [`authenticate`] turns the request headers into an [`AuthContext`];
/// [`jwt_auth_middleware`] runs it in front of protected routes and inserts
/// the context into the request extensions, where handlers pick it up with
/// `Extension<AuthContext>`.
///
/// A missing header, a non-Bearer scheme or an empty token is
/// [`AuthError::MissingCredentials`] (401). A token that fails signature,
/// expiry or issuer checks is [`AuthError::InvalidToken`] (403).
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use projecthub_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.username
/// }
///
/// let secret = "an-example-secret-that-is-32-bytes!".to_string();
/// let app: Router = Router::new()
///     .route("/me", get(whoami))
///     .layer(middleware::from_fn(move |req: axum::extract::Request, next: middleware::Next| {
///         jwt_auth_middleware(secret.clone(), req, next)
///     }));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_token, Claims};

/// Identity of the caller, attached to every authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access token required")]
    MissingCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "unauthorized", "Access token required")
            }
            AuthError::InvalidToken(_) => (StatusCode::FORBIDDEN, "forbidden", "Invalid token"),
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::MissingCredentials)?;

    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}

/// Validates the bearer token in `headers`
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, secret).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(AuthContext::from(claims))
}

/// Rejects unauthenticated requests and attaches [`AuthContext`] to the rest
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth = authenticate(req.headers(), &secret)?;

    tracing::debug!(user_id = %auth.user_id, "Authenticated request");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
