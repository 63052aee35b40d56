use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{approval, models, routes};

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::health::health,
		routes::approval::approval_status,
		routes::dashboard::dashboard,
		routes::departments::list_departments,
		routes::departments::create_department,
		routes::departments::get_department,
		routes::departments::rename_department,
		routes::departments::delete_department,
		routes::projects::list_department_projects,
		routes::projects::create_project,
		routes::projects::get_project,
		routes::projects::update_project,
		routes::projects::delete_project,
		routes::projects::remove_attachment,
		routes::tasks::list_tasks,
		routes::tasks::list_project_tasks,
		routes::tasks::create_task,
		routes::tasks::update_task,
		routes::tasks::delete_task,
		routes::users::list_users,
		routes::users::update_user,
		routes::users::delete_user,
		routes::users::sync_users,
		routes::webhooks::identity_webhook
	),
	components(
		schemas(
			routes::health::HealthResponse,
			approval::ApprovalStatus,
			models::dashboard::DashboardCounts,
			models::department::Department,
			models::department::DepartmentRequest,
			models::project::Project,
			models::project::ProjectWithTasks,
			models::project::ProjectCreateRequest,
			models::project::ProjectUpdateRequest,
			models::project::AttachmentRemoveRequest,
			models::task::Task,
			models::task::TaskStatus,
			models::task::TaskWithProject,
			models::task::TaskCreateRequest,
			models::task::TaskUpdateRequest,
			models::user::User,
			models::user::UserWithDepartment,
			models::user::UserUpdateRequest,
			models::user::SuccessResponse,
			models::user::SyncResponse
		)
	),
	tags(
		(name = "Health", description = "Service health"),
		(name = "Approval", description = "Account approval status"),
		(name = "Dashboard", description = "Record tallies"),
		(name = "Departments", description = "Department management"),
		(name = "Projects", description = "Project management"),
		(name = "Tasks", description = "Task management"),
		(name = "Users", description = "User administration"),
		(name = "Webhooks", description = "Identity-provider events")
	)
)]
pub struct ApiDoc;

pub fn build_openapi(port: u16) -> anyhow::Result<Value> {
	let mut doc = serde_json::to_value(ApiDoc::openapi())?;

	normalize_path_operations(&mut doc);
	ensure_security_components(&mut doc);
	add_examples(&mut doc);
	ensure_servers(&mut doc, port);

	Ok(doc)
}

pub fn swagger_routes(doc: Value) -> Router {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true)
		.with_credentials(true)
		.persist_authorization(true);

	let doc_json = Arc::new(doc);

	let json_route = get(move || {
		let doc_json = Arc::clone(&doc_json);
		async move { Json((*doc_json).clone()) }
	});

	Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/swagger-ui").config(swagger_config))
}

fn normalize_path_operations(doc: &mut Value) {
	if let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) {
		let snapshot = paths.clone();
		for (path, item) in snapshot {
			if let Some(ops) = item.as_object() {
				let mut normalized = Map::new();
				for (method, val) in ops {
					let key = method.to_lowercase();
					if let Some(existing) = normalized.get_mut(&key) {
						merge_values(existing, val);
					} else {
						normalized.insert(key, val.clone());
					}
				}
				paths.insert(path, Value::Object(normalized));
			}
		}
	}
}

fn ensure_security_components(doc: &mut Value) {
	let Some(root) = doc.as_object_mut() else { return; };
	let Some(components) = root
		.entry("components")
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
	else {
		return;
	};
	let Some(schemes) = components
		.entry("securitySchemes")
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
	else {
		return;
	};

	schemes.insert(
		"bearerAuth".to_string(),
		json!({
			"type": "http",
			"scheme": "bearer",
			"bearerFormat": "JWT"
		}),
	);
}

fn add_examples(doc: &mut Value) {
	if let Some(paths) = doc.get_mut("paths").and_then(Value::as_object_mut) {
		for item in paths.values_mut() {
			if let Some(operations) = item.as_object_mut() {
				for operation in operations.values_mut() {
					apply_request_examples(operation);
				}
			}
		}
	}
}

fn apply_request_examples(operation: &mut Value) {
	let Some(request_body) = operation.get_mut("requestBody") else { return; };
	let Some(content) = request_body.get_mut("content").and_then(Value::as_object_mut) else { return; };
	let Some(app_json) = content.get_mut("application/json").and_then(Value::as_object_mut) else { return; };
	let Some(schema) = app_json.get("schema").and_then(Value::as_object) else { return; };
	let Some(reference) = schema.get("$ref").and_then(Value::as_str) else { return; };

	let example = match reference {
		"#/components/schemas/DepartmentRequest" => Some(json!({
			"name": "Estate Department"
		})),
		"#/components/schemas/ProjectCreateRequest" => Some(json!({
			"name": "Land Registry Digitisation",
			"description": "Scan and index the archived land titles.",
			"start_date": "2025-05-01T00:00:00Z",
			"end_date": "2025-07-31T00:00:00Z",
			"attachments": []
		})),
		"#/components/schemas/TaskCreateRequest" => Some(json!({
			"title": "Scan 1998 title deeds",
			"status": "pending",
			"start_date": "2025-05-02T00:00:00Z",
			"end_date": "2025-05-09T00:00:00Z"
		})),
		"#/components/schemas/TaskUpdateRequest" => Some(json!({
			"status": "in_progress"
		})),
		"#/components/schemas/UserUpdateRequest" => Some(json!({
			"first_name": "Ada",
			"last_name": "Lovelace",
			"role": "member",
			"position": "Surveyor",
			"department_id": "00000000-0000-0000-0000-000000000000",
			"department_head": true
		})),
		_ => None,
	};

	if let Some(example) = example {
		app_json.insert("example".to_string(), example);
	}
}

fn ensure_servers(doc: &mut Value, port: u16) {
	let Some(root) = doc.as_object_mut() else { return; };
	root.entry("servers")
		.or_insert_with(|| json!([{ "url": format!("http://localhost:{port}") }]));
}

fn merge_values(target: &mut Value, addition: &Value) {
	match (target, addition) {
		(Value::Object(existing), Value::Object(extra)) => {
			for (key, value) in extra {
				match existing.get_mut(key) {
					Some(current) => merge_values(current, value),
					None => {
						existing.insert(key.clone(), value.clone());
					}
				}
			}
		}
		(Value::Array(existing), Value::Array(extra)) => {
			for item in extra {
				if !existing.contains(item) {
					existing.push(item.clone());
				}
			}
		}
		_ => {}
	}
}
