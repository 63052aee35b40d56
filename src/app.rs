use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::{DefaultPolicyEvaluator, PolicyEvaluator};
use crate::db::{Repository, SqliteRepository};
use crate::errors::AppError;
use crate::identity::{IdentityConfig, IdentityProvider};
use crate::jwt::JwtConfig;
use crate::routes::{approval, dashboard, departments, health, projects, tasks, users, webhooks};
use crate::webhook::WebhookConfig;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub policy: Arc<dyn PolicyEvaluator>,
    pub jwt: Arc<JwtConfig>,
    pub webhook: Arc<WebhookConfig>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn Repository>,
        identity: Arc<dyn IdentityProvider>,
        policy: Arc<dyn PolicyEvaluator>,
        jwt: JwtConfig,
        webhook: WebhookConfig,
    ) -> Self {
        Self {
            repo,
            identity,
            policy,
            jwt: Arc::new(jwt),
            webhook: Arc::new(webhook),
        }
    }

    pub fn from_env(pool: SqlitePool) -> Result<Self, AppError> {
        Ok(Self::new(
            Arc::new(SqliteRepository::new(pool)),
            IdentityConfig::from_env()?.build(),
            Arc::new(DefaultPolicyEvaluator::new()),
            JwtConfig::from_env()?,
            WebhookConfig::from_env()?,
        ))
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let state = AppState::from_env(pool)?;
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(Any)
        .allow_headers(Any);

    let department_routes = Router::new()
        .route("/", get(departments::list_departments).post(departments::create_department))
        .route(
            "/:id",
            get(departments::get_department)
                .put(departments::rename_department)
                .delete(departments::delete_department),
        )
        .route(
            "/:id/projects",
            get(projects::list_department_projects).post(projects::create_project),
        );

    let project_routes = Router::new()
        .route(
            "/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/:id/attachments", delete(projects::remove_attachment))
        .route("/:id/tasks", get(tasks::list_project_tasks).post(tasks::create_task));

    let task_routes = Router::new()
        .route("/", get(tasks::list_tasks))
        .route("/:id", put(tasks::update_task).delete(tasks::delete_task));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/sync", post(users::sync_users))
        .route("/:id", axum::routing::patch(users::update_user).delete(users::delete_user));

    let api = Router::new()
        .route("/health", get(health::health))
        .route("/approval-status", get(approval::approval_status))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/webhooks/identity", post(webhooks::identity_webhook))
        .nest("/departments", department_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/users", user_routes);

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
