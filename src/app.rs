use anyhow::Context;
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{Argon2Hasher, TokenIssuer};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, HealthCheck, PgTaskRepository, PgUserRepository, TaskRepository, UserRepository};
use crate::handlers;
use crate::middleware::require_identity;
use crate::services::{CredentialService, TaskService};
use crate::session::SessionCookies;
use crate::validator::{TaskValidator, UserValidator};

/// Everything a handler can reach. Cloned per request; all members are shared.
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
    pub tasks: Arc<TaskService>,
    pub tokens: Arc<TokenIssuer>,
    pub cookies: Arc<SessionCookies>,
    pub health: Arc<dyn HealthCheck>,
    pub cors_origins: Arc<[String]>,
}

impl AppState {
    /// Wire the services against PostgreSQL
    pub fn new(config: &AppConfig, database: &DatabaseManager) -> anyhow::Result<Self> {
        let pool = database.pool().clone();
        Self::from_parts(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTaskRepository::new(pool)),
            Arc::new(database.clone()),
        )
    }

    /// Wire the services against any store implementation
    pub fn from_parts(
        config: &AppConfig,
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        health: Arc<dyn HealthCheck>,
    ) -> anyhow::Result<Self> {
        let security = &config.security;
        let ttl_hours = i64::try_from(security.token_ttl_hours).context("token TTL out of range")?;
        let ttl = Duration::try_hours(ttl_hours).context("token TTL out of range")?;

        let tokens = Arc::new(TokenIssuer::new(security.token_secret.as_bytes(), ttl)?);
        let hasher = Arc::new(Argon2Hasher::new(security.password)?);

        let credentials = CredentialService::new(users, hasher, Arc::clone(&tokens), Arc::new(UserValidator));
        let tasks = TaskService::new(tasks, Arc::new(TaskValidator));

        Ok(Self {
            credentials: Arc::new(credentials),
            tasks: Arc::new(tasks),
            tokens,
            cookies: Arc::new(SessionCookies::from_config(security, ttl)),
            health,
            cors_origins: security.cors_origins.clone().into(),
        })
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        // Session required
        .merge(task_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

fn task_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::tasks;

    Router::new()
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(state, require_identity))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| {
            // A wildcard cannot be combined with credentials
            let wildcard = origin.trim() == "*";
            if wildcard {
                tracing::warn!("Ignoring wildcard CORS origin; list front-end origins explicitly");
            }
            !wildcard
        })
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Cookies cross origins, so the allow-list must be explicit
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Task API (Rust)",
        "version": version,
        "endpoints": {
            "signup": "POST /signup (public)",
            "login": "POST /login (public, sets session cookie)",
            "logout": "POST /logout (public, clears session cookie)",
            "tasks": "GET|POST /tasks (session)",
            "task": "GET|PUT|DELETE /tasks/:id (session)",
            "health": "GET /health (public)"
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
