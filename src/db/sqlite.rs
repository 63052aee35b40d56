use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::repository::Repository;
use crate::errors::{AppError, AppResult};
use crate::models::department::{DbDepartment, Department};
use crate::models::project::{DbProject, Project};
use crate::models::task::{DbTask, DbTaskWithProject, Task, TaskWithProject};
use crate::models::user::{DbUser, User, UserWithDepartment};

const PROJECT_COLUMNS: &str =
    "id, name, description, start_date, end_date, department_id, created_by, attachments, created_at, updated_at";

const TASK_COLUMNS: &str = "id, project_id, department_id, title, description, status, assigned_to, start_date, end_date, created_by, created_at, updated_at";

const USER_SELECT: &str = "SELECT u.id, u.email, u.full_name, u.role, u.position, u.department_id, u.department_head, u.created_at, u.updated_at, d.name AS department_name FROM users u LEFT JOIN departments d ON d.id = u.department_id";

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

fn attachments_json(project: &Project) -> AppResult<String> {
    serde_json::to_string(&project.attachments)
        .map_err(|err| AppError::internal(format!("failed to encode attachments: {err}")))
}

fn collect<D, T>(rows: Vec<D>) -> AppResult<Vec<T>>
where
    T: TryFrom<D, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_departments(&self) -> AppResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, DbDepartment>(
            "SELECT id, name, created_at FROM departments ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn get_department(&self, id: Uuid) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, DbDepartment>("SELECT id, name, created_at FROM departments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Department::try_from)
            .transpose()
    }

    async fn insert_department(&self, department: &Department) -> AppResult<()> {
        sqlx::query("INSERT INTO departments (id, name, created_at) VALUES (?, ?, ?)")
            .bind(department.id.to_string())
            .bind(&department.name)
            .bind(department.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn rename_department(&self, id: Uuid, name: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE departments SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_department(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_projects_in_department(&self, department_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE department_id = ?")
            .bind(department_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_projects(&self, department_id: Uuid) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, DbProject>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE department_id = ? ORDER BY created_at DESC"
        ))
        .bind(department_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn get_project(&self, id: Uuid) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, DbProject>(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Project::try_from)
            .transpose()
    }

    async fn insert_project(&self, project: &Project) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO projects ({PROJECT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(project.id.to_string())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.department_id.to_string())
        .bind(&project.created_by)
        .bind(attachments_json(project)?)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> AppResult<bool> {
        // department_id is fixed at creation.
        let result = sqlx::query(
            "UPDATE projects SET name = ?, description = ?, start_date = ?, end_date = ?, attachments = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(attachments_json(project)?)
        .bind(project.updated_at)
        .bind(project.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_project(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tasks_for_project(&self, project_id: Uuid) -> AppResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, DbTask>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? ORDER BY created_at ASC"
        ))
        .bind(project_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn list_tasks_for_department(&self, department_id: Uuid) -> AppResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, DbTask>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE department_id = ? ORDER BY created_at ASC"
        ))
        .bind(department_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn list_tasks(&self) -> AppResult<Vec<TaskWithProject>> {
        let rows = sqlx::query_as::<_, DbTaskWithProject>(
            "SELECT t.id, t.project_id, t.department_id, t.title, t.description, t.status, t.assigned_to, \
             t.start_date, t.end_date, t.created_by, t.created_at, t.updated_at, p.name AS project_name \
             FROM tasks t LEFT JOIN projects p ON p.id = t.project_id \
             ORDER BY t.start_date IS NULL, t.start_date ASC, t.created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        collect(rows)
    }

    async fn get_task(&self, id: Uuid) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, DbTask>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn insert_task(&self, task: &Task) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(task.id.to_string())
        .bind(task.project_id.to_string())
        .bind(task.department_id.to_string())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(&task.assigned_to)
        .bind(task.start_date)
        .bind(task.end_date)
        .bind(&task.created_by)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, status = ?, assigned_to = ?, start_date = ?, end_date = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(&task.assigned_to)
        .bind(task.start_date)
        .bind(task.end_date)
        .bind(task.updated_at)
        .bind(task.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_task(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> AppResult<Vec<UserWithDepartment>> {
        let rows = sqlx::query_as::<_, DbUser>(&format!("{USER_SELECT} ORDER BY u.created_at DESC"))
            .fetch_all(&self.pool)
            .await?;

        collect(rows)
    }

    async fn get_user(&self, id: &str) -> AppResult<Option<UserWithDepartment>> {
        sqlx::query_as::<_, DbUser>(&format!("{USER_SELECT} WHERE u.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(UserWithDepartment::try_from)
            .transpose()
    }

    async fn upsert_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, full_name, role, position, department_id, department_head, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET email = excluded.email, full_name = excluded.full_name, role = excluded.role, \
             position = excluded.position, department_id = excluded.department_id, \
             department_head = excluded.department_head, updated_at = excluded.updated_at",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.role)
        .bind(&user.position)
        .bind(user.department_id.map(|id| id.to_string()))
        .bind(user.department_head)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_departments(&self) -> AppResult<i64> {
        self.count("SELECT COUNT(*) FROM departments").await
    }

    async fn count_projects(&self) -> AppResult<i64> {
        self.count("SELECT COUNT(*) FROM projects").await
    }

    async fn count_tasks(&self) -> AppResult<i64> {
        self.count("SELECT COUNT(*) FROM tasks").await
    }
}
