use anyhow::Result;

use dept_tracker::docs::build_openapi;

#[test]
fn openapi_lists_every_route() -> Result<()> {
    let doc = build_openapi(8000)?;
    let paths = doc["paths"]
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("no paths in document"))?;

    for (path, method) in [
        ("/api/health", "get"),
        ("/api/approval-status", "get"),
        ("/api/dashboard", "get"),
        ("/api/departments", "post"),
        ("/api/departments/{id}", "delete"),
        ("/api/departments/{id}/projects", "get"),
        ("/api/projects/{id}", "delete"),
        ("/api/projects/{id}/attachments", "delete"),
        ("/api/projects/{id}/tasks", "post"),
        ("/api/tasks", "get"),
        ("/api/tasks/{id}", "put"),
        ("/api/users/{id}", "patch"),
        ("/api/users/sync", "post"),
        ("/api/webhooks/identity", "post"),
    ] {
        assert!(
            paths.get(path).and_then(|item| item.get(method)).is_some(),
            "missing {method} {path}"
        );
    }

    Ok(())
}

#[test]
fn openapi_declares_bearer_auth_and_server() -> Result<()> {
    let doc = build_openapi(9100)?;

    assert_eq!(doc["components"]["securitySchemes"]["bearerAuth"]["scheme"], "bearer");
    assert_eq!(doc["servers"][0]["url"], "http://localhost:9100");

    let example = &doc["paths"]["/api/departments"]["post"]["requestBody"]["content"]["application/json"]["example"];
    assert_eq!(example["name"], "Estate Department");

    for schema in ["Department", "ProjectWithTasks", "TaskStatus", "UserUpdateRequest", "ApprovalStatus"] {
        assert!(
            doc["components"]["schemas"].get(schema).is_some(),
            "missing schema {schema}"
        );
    }

    Ok(())
}
