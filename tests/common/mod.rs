#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use dept_tracker::authz::DefaultPolicyEvaluator;
use dept_tracker::db::SqliteRepository;
use dept_tracker::identity::{Identity, InMemoryIdentityProvider, PublicMetadata};
use dept_tracker::jwt::JwtConfig;
use dept_tracker::webhook::WebhookConfig;
use dept_tracker::{router, AppState};

pub const JWT_SECRET: &str = "test-secret";
pub const WEBHOOK_SECRET: &[u8] = b"webhook-secret";
pub const BOOTSTRAP_EMAIL: &str = "founder@example.com";

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub jwt: JwtConfig,
    pub webhook: WebhookConfig,
    _dir: TempDir,
}

pub async fn spawn() -> Result<TestApp> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("test.db");

    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator =
        sqlx::migrate::Migrator::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")).await?;
    migrator.run(&pool).await?;

    let identity = Arc::new(InMemoryIdentityProvider::new());
    let jwt = JwtConfig::new(JWT_SECRET, 1);
    let webhook = WebhookConfig::new(WEBHOOK_SECRET.to_vec(), Some(BOOTSTRAP_EMAIL.to_string()));

    let state = AppState::new(
        Arc::new(SqliteRepository::new(pool.clone())),
        identity.clone(),
        Arc::new(DefaultPolicyEvaluator::new()),
        jwt.clone(),
        webhook.clone(),
    );

    Ok(TestApp {
        app: router(state),
        pool,
        identity,
        jwt,
        webhook,
        _dir: dir,
    })
}

impl TestApp {
    /// Registers an identity and returns a bearer token for it.
    pub fn sign_in(&self, id: &str, metadata: PublicMetadata) -> Result<String> {
        self.identity
            .insert(Identity::new(id, format!("{id}@example.com")).with_metadata(metadata));
        Ok(self.jwt.encode(id)?)
    }

    pub fn sysadmin(&self) -> Result<String> {
        self.sign_in("user_sysadmin", metadata("sysadmin", None, false))
    }

    pub fn head_of(&self, id: &str, department_id: Uuid) -> Result<String> {
        self.sign_in(id, metadata("member", Some(department_id), true))
    }

    pub fn member_of(&self, id: &str, department_id: Uuid) -> Result<String> {
        self.sign_in(id, metadata("member", Some(department_id), false))
    }

    pub async fn send(&self, req: Request<Body>) -> Result<(StatusCode, Value)> {
        let resp = self.app.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(req).await
    }

    /// Creates a department as the sysadmin and returns its id.
    pub async fn create_department(&self, name: &str) -> Result<Uuid> {
        let token = self.sysadmin()?;
        let (status, body) = self
            .call("POST", "/api/departments", Some(&token), Some(serde_json::json!({ "name": name })))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "department create failed: {body}");
        Ok(id_of(&body)?)
    }

    pub async fn create_project(&self, token: &str, department_id: Uuid, name: &str) -> Result<(StatusCode, Value)> {
        self.call(
            "POST",
            &format!("/api/departments/{department_id}/projects"),
            Some(token),
            Some(serde_json::json!({ "name": name })),
        )
        .await
    }
}

pub fn metadata(role: &str, department_id: Option<Uuid>, head: bool) -> PublicMetadata {
    PublicMetadata {
        role: Some(role.to_string()),
        department_id: department_id.map(|id| id.to_string()),
        department_head: Some(head),
        position: None,
    }
}

pub fn id_of(body: &Value) -> Result<Uuid> {
    let id = body
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("response has no id: {body}"))?;
    Ok(Uuid::parse_str(id)?)
}
