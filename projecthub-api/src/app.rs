/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use projecthub_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ErrorResponse, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use projecthub_shared::auth::middleware::jwt_auth_middleware;
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// GET  /health                                   public
/// POST /api/auth/register                        public
/// POST /api/auth/login                           public
/// GET  /api/projects                             bearer
/// POST /api/projects
/// GET  /api/projects/:id
/// GET  /api/projects/:id/tasks
/// POST /api/projects/:id/tasks
/// PUT  /api/projects/:id/tasks/:task_id
/// DEL  /api/projects/:id/tasks/:task_id
/// GET  /api/tasks/:id/comments
/// POST /api/tasks/:id/comments
/// GET  /api/notifications
/// PUT  /api/notifications/:id/read
/// PUT  /api/notifications/read-all
/// GET  /api/users/search?query=
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let secret = state.config.jwt.secret.clone();

    let api_routes = Router::new()
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route("/projects/:id", get(routes::projects::get_project))
        .route(
            "/projects/:id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/projects/:id/tasks/:task_id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route(
            "/tasks/:id/comments",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route("/notifications", get(routes::notifications::list_notifications))
        .route(
            "/notifications/read-all",
            put(routes::notifications::mark_all_read),
        )
        .route(
            "/notifications/:id/read",
            put(routes::notifications::mark_read),
        )
        .route("/users/search", get(routes::users::search_users))
        .route_layer(middleware::from_fn(move |req: Request, next: Next| {
            jwt_auth_middleware(secret.clone(), req, next)
        }))
        // Added after route_layer so they stay public
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::HeaderName::from_static("x-poll-interval")])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not_found".to_string(),
            message: "Route not found".to_string(),
            details: None,
        }),
    )
}
