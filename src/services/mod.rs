//! Gated operations behind the HTTP handlers.
//!
//! Every mutation validates its input, asks the policy evaluator, and only
//! then touches the repository or the identity provider. Reads require an
//! approved actor.

pub mod dashboard;
pub mod departments;
pub mod projects;
pub mod tasks;
pub mod users;

use crate::authz::{Actor, Permission, ResourceContext};
use crate::app::AppState;
use crate::errors::AppResult;

pub(crate) fn authorize(state: &AppState, actor: &Actor, permission: Permission, ctx: &ResourceContext) -> AppResult<()> {
    let result = state.policy.authorize(actor, permission, ctx);
    if result.is_err() {
        tracing::info!(
            actor_id = actor.id.as_deref().unwrap_or("anonymous"),
            permission = permission.as_str(),
            "permission denied"
        );
    }
    result
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::app::AppState;
    use crate::authz::DefaultPolicyEvaluator;
    use crate::db::Repository;
    use crate::errors::AppResult;
    use crate::identity::{IdentityProvider, InMemoryIdentityProvider};
    use crate::jwt::JwtConfig;
    use crate::models::department::Department;
    use crate::models::project::Project;
    use crate::models::task::{Task, TaskWithProject};
    use crate::models::user::{User, UserWithDepartment};
    use crate::webhook::WebhookConfig;

    #[derive(Default)]
    struct Tables {
        departments: Vec<Department>,
        projects: Vec<Project>,
        tasks: Vec<Task>,
        users: Vec<User>,
    }

    /// In-memory repository that records the name of every call it serves.
    #[derive(Default)]
    pub struct RecordingRepository {
        tables: Mutex<Tables>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingRepository {
        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        pub fn called(&self, name: &str) -> bool {
            self.calls().iter().any(|call| *call == name)
        }

        pub fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        pub fn user(&self, id: &str) -> Option<User> {
            self.tables.lock().unwrap().users.iter().find(|u| u.id == id).cloned()
        }

        fn record(&self, name: &'static str) -> std::sync::MutexGuard<'_, Tables> {
            self.calls.lock().unwrap().push(name);
            self.tables.lock().unwrap()
        }

        fn with_department_name(tables: &Tables, user: &User) -> UserWithDepartment {
            let department_name = user.department_id.and_then(|id| {
                tables
                    .departments
                    .iter()
                    .find(|d| d.id == id)
                    .map(|d| d.name.clone())
            });
            UserWithDepartment {
                user: user.clone(),
                department_name,
            }
        }
    }

    fn replace<T>(rows: &mut [T], matches: impl Fn(&T) -> bool, value: T) -> bool {
        match rows.iter_mut().find(|row| matches(row)) {
            Some(row) => {
                *row = value;
                true
            }
            None => false,
        }
    }

    fn remove<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
        let before = rows.len();
        rows.retain(|row| !matches(row));
        rows.len() != before
    }

    #[async_trait]
    impl Repository for RecordingRepository {
        async fn ping(&self) -> AppResult<()> {
            drop(self.record("ping"));
            Ok(())
        }

        async fn list_departments(&self) -> AppResult<Vec<Department>> {
            let mut departments = self.record("list_departments").departments.clone();
            departments.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(departments)
        }

        async fn get_department(&self, id: Uuid) -> AppResult<Option<Department>> {
            Ok(self.record("get_department").departments.iter().find(|d| d.id == id).cloned())
        }

        async fn insert_department(&self, department: &Department) -> AppResult<()> {
            self.record("insert_department").departments.push(department.clone());
            Ok(())
        }

        async fn rename_department(&self, id: Uuid, name: &str) -> AppResult<bool> {
            let mut tables = self.record("rename_department");
            Ok(match tables.departments.iter_mut().find(|d| d.id == id) {
                Some(department) => {
                    department.name = name.to_string();
                    true
                }
                None => false,
            })
        }

        async fn delete_department(&self, id: Uuid) -> AppResult<bool> {
            Ok(remove(&mut self.record("delete_department").departments, |d| d.id == id))
        }

        async fn count_projects_in_department(&self, department_id: Uuid) -> AppResult<i64> {
            let tables = self.record("count_projects_in_department");
            Ok(tables.projects.iter().filter(|p| p.department_id == department_id).count() as i64)
        }

        async fn list_projects(&self, department_id: Uuid) -> AppResult<Vec<Project>> {
            let tables = self.record("list_projects");
            let mut projects: Vec<Project> = tables
                .projects
                .iter()
                .filter(|p| p.department_id == department_id)
                .cloned()
                .collect();
            projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(projects)
        }

        async fn get_project(&self, id: Uuid) -> AppResult<Option<Project>> {
            Ok(self.record("get_project").projects.iter().find(|p| p.id == id).cloned())
        }

        async fn insert_project(&self, project: &Project) -> AppResult<()> {
            self.record("insert_project").projects.push(project.clone());
            Ok(())
        }

        async fn update_project(&self, project: &Project) -> AppResult<bool> {
            let mut tables = self.record("update_project");
            Ok(replace(&mut tables.projects, |p| p.id == project.id, project.clone()))
        }

        async fn delete_project(&self, id: Uuid) -> AppResult<bool> {
            let mut tables = self.record("delete_project");
            tables.tasks.retain(|t| t.project_id != id);
            Ok(remove(&mut tables.projects, |p| p.id == id))
        }

        async fn list_tasks_for_project(&self, project_id: Uuid) -> AppResult<Vec<Task>> {
            let tables = self.record("list_tasks_for_project");
            Ok(tables.tasks.iter().filter(|t| t.project_id == project_id).cloned().collect())
        }

        async fn list_tasks_for_department(&self, department_id: Uuid) -> AppResult<Vec<Task>> {
            let tables = self.record("list_tasks_for_department");
            Ok(tables
                .tasks
                .iter()
                .filter(|t| t.department_id == department_id)
                .cloned()
                .collect())
        }

        async fn list_tasks(&self) -> AppResult<Vec<TaskWithProject>> {
            let tables = self.record("list_tasks");
            let mut tasks: Vec<TaskWithProject> = tables
                .tasks
                .iter()
                .map(|task| TaskWithProject {
                    task: task.clone(),
                    project_name: tables
                        .projects
                        .iter()
                        .find(|p| p.id == task.project_id)
                        .map(|p| p.name.clone()),
                })
                .collect();
            tasks.sort_by_key(|t| (t.task.start_date.is_none(), t.task.start_date));
            Ok(tasks)
        }

        async fn get_task(&self, id: Uuid) -> AppResult<Option<Task>> {
            Ok(self.record("get_task").tasks.iter().find(|t| t.id == id).cloned())
        }

        async fn insert_task(&self, task: &Task) -> AppResult<()> {
            self.record("insert_task").tasks.push(task.clone());
            Ok(())
        }

        async fn update_task(&self, task: &Task) -> AppResult<bool> {
            let mut tables = self.record("update_task");
            Ok(replace(&mut tables.tasks, |t| t.id == task.id, task.clone()))
        }

        async fn delete_task(&self, id: Uuid) -> AppResult<bool> {
            Ok(remove(&mut self.record("delete_task").tasks, |t| t.id == id))
        }

        async fn list_users(&self) -> AppResult<Vec<UserWithDepartment>> {
            let tables = self.record("list_users");
            Ok(tables
                .users
                .iter()
                .map(|user| Self::with_department_name(&tables, user))
                .collect())
        }

        async fn get_user(&self, id: &str) -> AppResult<Option<UserWithDepartment>> {
            let tables = self.record("get_user");
            Ok(tables
                .users
                .iter()
                .find(|u| u.id == id)
                .map(|user| Self::with_department_name(&tables, user)))
        }

        async fn upsert_user(&self, user: &User) -> AppResult<()> {
            let mut tables = self.record("upsert_user");
            if !replace(&mut tables.users, |u| u.id == user.id, user.clone()) {
                tables.users.push(user.clone());
            }
            Ok(())
        }

        async fn delete_user(&self, id: &str) -> AppResult<bool> {
            Ok(remove(&mut self.record("delete_user").users, |u| u.id == id))
        }

        async fn count_departments(&self) -> AppResult<i64> {
            Ok(self.record("count_departments").departments.len() as i64)
        }

        async fn count_projects(&self) -> AppResult<i64> {
            Ok(self.record("count_projects").projects.len() as i64)
        }

        async fn count_tasks(&self) -> AppResult<i64> {
            Ok(self.record("count_tasks").tasks.len() as i64)
        }
    }

    pub struct Harness {
        pub state: AppState,
        pub repo: Arc<RecordingRepository>,
        pub identity: Arc<InMemoryIdentityProvider>,
    }

    pub fn harness() -> Harness {
        let repo = Arc::new(RecordingRepository::default());
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let state = AppState::new(
            repo.clone(),
            identity.clone() as Arc<dyn IdentityProvider>,
            Arc::new(DefaultPolicyEvaluator::new()),
            JwtConfig::new("test-secret", 1),
            WebhookConfig::new(b"webhook-secret".to_vec(), None),
        );

        Harness { state, repo, identity }
    }
}
