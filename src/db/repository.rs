use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::department::Department;
use crate::models::project::Project;
use crate::models::task::{Task, TaskWithProject};
use crate::models::user::{User, UserWithDepartment};

/// Persistence boundary. Mutations return `false` when no row matched.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn ping(&self) -> AppResult<()>;

    // departments
    async fn list_departments(&self) -> AppResult<Vec<Department>>;
    async fn get_department(&self, id: Uuid) -> AppResult<Option<Department>>;
    async fn insert_department(&self, department: &Department) -> AppResult<()>;
    async fn rename_department(&self, id: Uuid, name: &str) -> AppResult<bool>;
    async fn delete_department(&self, id: Uuid) -> AppResult<bool>;
    async fn count_projects_in_department(&self, department_id: Uuid) -> AppResult<i64>;

    // projects, newest first
    async fn list_projects(&self, department_id: Uuid) -> AppResult<Vec<Project>>;
    async fn get_project(&self, id: Uuid) -> AppResult<Option<Project>>;
    async fn insert_project(&self, project: &Project) -> AppResult<()>;
    async fn update_project(&self, project: &Project) -> AppResult<bool>;
    async fn delete_project(&self, id: Uuid) -> AppResult<bool>;

    // tasks
    async fn list_tasks_for_project(&self, project_id: Uuid) -> AppResult<Vec<Task>>;
    async fn list_tasks_for_department(&self, department_id: Uuid) -> AppResult<Vec<Task>>;
    /// Every task with its project's name, earliest `start_date` first.
    async fn list_tasks(&self) -> AppResult<Vec<TaskWithProject>>;
    async fn get_task(&self, id: Uuid) -> AppResult<Option<Task>>;
    async fn insert_task(&self, task: &Task) -> AppResult<()>;
    async fn update_task(&self, task: &Task) -> AppResult<bool>;
    async fn delete_task(&self, id: Uuid) -> AppResult<bool>;

    // user mirror
    async fn list_users(&self) -> AppResult<Vec<UserWithDepartment>>;
    async fn get_user(&self, id: &str) -> AppResult<Option<UserWithDepartment>>;
    async fn upsert_user(&self, user: &User) -> AppResult<()>;
    async fn delete_user(&self, id: &str) -> AppResult<bool>;

    // tallies
    async fn count_departments(&self) -> AppResult<i64>;
    async fn count_projects(&self) -> AppResult<i64>;
    async fn count_tasks(&self) -> AppResult<i64>;
}
