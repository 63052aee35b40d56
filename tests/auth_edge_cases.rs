mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};

use common::metadata;

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let app = common::spawn().await?;

    for (method, uri) in [
        ("GET", "/api/departments"),
        ("GET", "/api/tasks"),
        ("GET", "/api/users"),
        ("GET", "/api/dashboard"),
        ("GET", "/api/approval-status"),
    ] {
        let (status, body) = app.call(method, uri, None, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri} without token: {body}");
        assert_eq!(body["error"], "unauthorized");
    }

    Ok(())
}

#[tokio::test]
async fn malformed_and_foreign_tokens_are_rejected() -> Result<()> {
    let app = common::spawn().await?;
    app.sysadmin()?;

    let (status, _) = app.call("GET", "/api/departments", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = dept_tracker::jwt::JwtConfig::new("another-secret", 1).encode("user_sysadmin")?;
    let (status, _) = app.call("GET", "/api/departments", Some(&foreign), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("GET")
        .uri("/api/departments")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())?;
    let (status, _) = app.send(req).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn token_for_a_deleted_account_is_rejected() -> Result<()> {
    let app = common::spawn().await?;
    let token = app.jwt.encode("user_gone")?;

    let (status, body) = app.call("GET", "/api/departments", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");

    Ok(())
}

#[tokio::test]
async fn unapproved_accounts_cannot_read() -> Result<()> {
    let app = common::spawn().await?;
    app.create_department("Estate").await?;

    let no_department = app.sign_in("user_nodept", metadata("member", None, false))?;

    let (status, body) = app.call("GET", "/api/departments", Some(&no_department), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    assert_eq!(body["error"], "forbidden");

    let (status, _) = app.call("GET", "/api/tasks", Some(&no_department), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn unrecognized_role_reads_but_cannot_write() -> Result<()> {
    let app = common::spawn().await?;
    let department_id = app.create_department("Estate").await?;

    let odd_role = app.sign_in("user_odd", metadata("root", Some(department_id), true))?;

    let (status, _) = app.call("GET", "/api/departments", Some(&odd_role), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.create_project(&odd_role, department_id, "Should not exist").await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}
