use uuid::Uuid;

use super::actor::Actor;
use super::policy;
use crate::errors::AppError;

/// Mutations gated by the policy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageDepartments,
    CreateProject,
    EditProject,
    DeleteProject,
    CreateTask,
    EditTask,
    DeleteTask,
    ManageUsers,
    EditUser,
    DeleteAttachment,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageDepartments => "department.manage",
            Permission::CreateProject => "project.create",
            Permission::EditProject => "project.update",
            Permission::DeleteProject => "project.delete",
            Permission::CreateTask => "task.create",
            Permission::EditTask => "task.update",
            Permission::DeleteTask => "task.delete",
            Permission::ManageUsers => "user.manage",
            Permission::EditUser => "user.update",
            Permission::DeleteAttachment => "attachment.delete",
        }
    }

    /// The user-facing rejection. User management answers 401 rather than 403.
    pub fn denial(&self) -> AppError {
        let message = match self {
            Permission::ManageDepartments => "only system administrators can manage departments",
            Permission::CreateProject => "you do not have permission to create projects in this department",
            Permission::EditProject => "department heads can only edit projects in their own department",
            Permission::DeleteProject => "you do not have permission to delete projects in this department",
            Permission::CreateTask => "you do not have permission to create tasks in this project",
            Permission::EditTask => "you do not have permission to edit tasks in this project",
            Permission::DeleteTask => "you do not have permission to delete tasks in this project",
            Permission::ManageUsers | Permission::EditUser => "only system administrators can manage users",
            Permission::DeleteAttachment => "you do not have permission to remove this attachment",
        };

        match self {
            Permission::ManageUsers | Permission::EditUser => AppError::unauthorized(message),
            _ => AppError::forbidden(format!("{message}; contact a system administrator if you need access")),
        }
    }
}

/// What the permission is being evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceContext {
    /// Department that owns (or will own) the resource.
    pub department_id: Option<Uuid>,
    /// Department the request was issued from.
    pub current_department_id: Option<Uuid>,
    pub owner_id: Option<String>,
}

impl ResourceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_department(mut self, department_id: Uuid) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn with_current_department(mut self, department_id: Uuid) -> Self {
        self.current_department_id = Some(department_id);
        self
    }

    pub fn with_owner(mut self, owner_id: Option<String>) -> Self {
        self.owner_id = owner_id;
        self
    }
}

/// Policy evaluator trait for pluggable authorization logic
pub trait PolicyEvaluator: Send + Sync {
    /// Check if the actor may perform `permission` against `ctx`
    fn can(&self, actor: &Actor, permission: Permission, ctx: &ResourceContext) -> bool;

    /// Same as [`PolicyEvaluator::can`], mapping a denial to its error.
    fn authorize(&self, actor: &Actor, permission: Permission, ctx: &ResourceContext) -> Result<(), AppError> {
        if self.can(actor, permission, ctx) {
            Ok(())
        } else {
            Err(permission.denial())
        }
    }
}

/// Department-scoped RBAC: sysadmins bypass scoping, department heads act
/// within their own department, everyone else is read-only.
#[derive(Debug, Clone, Default)]
pub struct DefaultPolicyEvaluator;

impl DefaultPolicyEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl PolicyEvaluator for DefaultPolicyEvaluator {
    fn can(&self, actor: &Actor, permission: Permission, ctx: &ResourceContext) -> bool {
        let allowed = match permission {
            Permission::ManageDepartments => policy::can_manage_departments(actor),
            Permission::CreateProject => policy::can_create_project(actor, ctx.department_id),
            Permission::EditProject => policy::can_edit_project(actor, ctx.department_id),
            Permission::DeleteProject => {
                policy::can_delete_project(actor, ctx.department_id, ctx.current_department_id)
            }
            Permission::CreateTask | Permission::EditTask => {
                policy::can_create_or_edit_task(actor, ctx.department_id)
            }
            Permission::DeleteTask => policy::can_delete_task(actor, ctx.department_id),
            Permission::ManageUsers => policy::can_manage_users(actor),
            Permission::EditUser => policy::can_edit_user(actor),
            Permission::DeleteAttachment => policy::can_delete_attachment(actor, ctx.owner_id.as_deref()),
        };

        tracing::debug!(
            actor_id = actor.id.as_deref().unwrap_or("anonymous"),
            role = actor.role.as_str(),
            permission = permission.as_str(),
            allowed,
            "authorization decision"
        );

        allowed
    }
}
