mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn dashboard_counts_every_record() -> Result<()> {
    let app = common::spawn().await?;
    let estate = app.create_department("Estate").await?;
    app.create_department("Works").await?;
    let head = app.head_of("user_head", estate)?;

    let (_, project) = app.create_project(&head, estate, "Title deeds").await?;
    let project_id = common::id_of(&project)?;
    for title in ["Scan", "Index"] {
        app.call(
            "POST",
            &format!("/api/projects/{project_id}/tasks"),
            Some(&head),
            Some(json!({ "title": title })),
        )
        .await?;
    }

    let (status, body) = app.call("GET", "/api/dashboard", Some(&head), None).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, json!({ "departments": 2, "projects": 1, "tasks": 2 }));

    Ok(())
}
