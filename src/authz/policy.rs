//! Pure permission predicates. Every predicate denies on absent or unknown
//! input; none of them touches the repository.

use uuid::Uuid;

use super::actor::Actor;

pub fn can_manage_departments(actor: &Actor) -> bool {
    actor.is_sysadmin()
}

pub fn can_create_project(actor: &Actor, target_department_id: Option<Uuid>) -> bool {
    actor.is_sysadmin() || actor.heads(target_department_id)
}

pub fn can_edit_project(actor: &Actor, target_department_id: Option<Uuid>) -> bool {
    can_create_project(actor, target_department_id)
}

/// `current_department_id` is the department the request was issued from; a
/// project whose stored department disagrees with it is never deletable by a head.
pub fn can_delete_project(
    actor: &Actor,
    project_department_id: Option<Uuid>,
    current_department_id: Option<Uuid>,
) -> bool {
    if actor.is_sysadmin() {
        return true;
    }

    match (project_department_id, current_department_id) {
        (Some(project), Some(current)) => project == current && actor.heads(Some(current)),
        _ => false,
    }
}

pub fn can_create_or_edit_task(actor: &Actor, target_department_id: Option<Uuid>) -> bool {
    actor.is_sysadmin() || actor.heads(target_department_id)
}

/// Requires the task to sit in the head's own department, like every other
/// scoped delete.
pub fn can_delete_task(actor: &Actor, task_department_id: Option<Uuid>) -> bool {
    actor.is_sysadmin() || actor.heads(task_department_id)
}

pub fn can_manage_users(actor: &Actor) -> bool {
    actor.is_sysadmin()
}

pub fn can_edit_user(actor: &Actor) -> bool {
    can_manage_users(actor)
}

pub fn can_delete_attachment(actor: &Actor, resource_owner_id: Option<&str>) -> bool {
    if !actor.has_known_role() {
        return false;
    }
    actor.is_sysadmin() || actor.heads_any_department() || actor.is(resource_owner_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::actor::Role;

    const ROLES: [Role; 4] = [Role::Member, Role::Admin, Role::Sysadmin, Role::Unknown];

    fn actor(role: Role, head: bool, department: Option<Uuid>) -> Actor {
        let mut actor = Actor::new("user_actor", role);
        actor.department_id = department;
        actor.is_department_head = head;
        actor
    }

    #[test]
    fn create_project_truth_table() {
        let dept_a = Uuid::new_v4();
        let dept_b = Uuid::new_v4();
        let departments = [None, Some(dept_a), Some(dept_b)];

        for role in ROLES {
            for head in [false, true] {
                for actor_dept in departments {
                    for target in departments {
                        let actor = actor(role, head, actor_dept);
                        let expected = role == Role::Sysadmin
                            || (role != Role::Unknown && head && actor_dept.is_some() && actor_dept == target);

                        assert_eq!(
                            can_create_project(&actor, target),
                            expected,
                            "role={role:?} head={head} actor_dept={actor_dept:?} target={target:?}"
                        );
                        assert_eq!(can_edit_project(&actor, target), expected);
                        assert_eq!(can_create_or_edit_task(&actor, target), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn sysadmin_creates_projects_anywhere() {
        let sysadmin = actor(Role::Sysadmin, false, None);
        let target = Uuid::new_v4();
        assert!(can_create_project(&sysadmin, Some(target)));
        assert!(can_delete_project(&sysadmin, Some(target), Some(Uuid::new_v4())));
    }

    #[test]
    fn head_cannot_delete_project_from_another_department() {
        let dept_a = Uuid::new_v4();
        let dept_b = Uuid::new_v4();
        let head = actor(Role::Member, true, Some(dept_a));

        assert!(!can_delete_project(&head, Some(dept_b), Some(dept_a)));
        assert!(!can_delete_project(&head, Some(dept_a), Some(dept_b)));
        assert!(!can_delete_project(&head, Some(dept_b), Some(dept_b)));
        assert!(!can_delete_project(&head, None, Some(dept_a)));
        assert!(can_delete_project(&head, Some(dept_a), Some(dept_a)));
    }

    #[test]
    fn head_deletes_tasks_only_in_own_department() {
        let dept_a = Uuid::new_v4();
        let head = actor(Role::Member, true, Some(dept_a));

        assert!(can_delete_task(&head, Some(dept_a)));
        assert!(!can_delete_task(&head, Some(Uuid::new_v4())));
        assert!(!can_delete_task(&head, None));
        assert!(!can_delete_task(&actor(Role::Member, true, None), Some(dept_a)));
    }

    #[test]
    fn only_sysadmin_manages_departments_and_users() {
        for role in ROLES {
            for head in [false, true] {
                let actor = actor(role, head, Some(Uuid::new_v4()));
                let expected = role == Role::Sysadmin;
                assert_eq!(can_manage_departments(&actor), expected);
                assert_eq!(can_manage_users(&actor), expected);
                assert_eq!(can_edit_user(&actor), expected);
            }
        }

        let unrecognised = Actor::from_metadata(
            "user_x",
            &crate::identity::PublicMetadata {
                role: Some("superuser".to_string()),
                ..Default::default()
            },
        );
        assert!(!can_manage_departments(&unrecognised));
        assert!(!can_manage_users(&unrecognised));
    }

    #[test]
    fn attachment_owner_may_delete_own_attachment() {
        let member = actor(Role::Member, false, Some(Uuid::new_v4()));

        assert!(can_delete_attachment(&member, Some("user_actor")));
        assert!(!can_delete_attachment(&member, Some("user_other")));
        assert!(!can_delete_attachment(&member, None));
        assert!(can_delete_attachment(&actor(Role::Member, true, Some(Uuid::new_v4())), Some("user_other")));
        assert!(!can_delete_attachment(&actor(Role::Member, true, None), Some("user_other")));
    }

    #[test]
    fn member_is_denied_every_mutation() {
        let dept = Uuid::new_v4();
        let member = actor(Role::Member, false, Some(dept));

        assert!(!can_manage_departments(&member));
        assert!(!can_create_project(&member, Some(dept)));
        assert!(!can_edit_project(&member, Some(dept)));
        assert!(!can_delete_project(&member, Some(dept), Some(dept)));
        assert!(!can_create_or_edit_task(&member, Some(dept)));
        assert!(!can_delete_task(&member, Some(dept)));
        assert!(!can_manage_users(&member));
    }

    #[test]
    fn anonymous_actor_fails_everything() {
        let anonymous = Actor::anonymous();
        let dept = Some(Uuid::new_v4());

        assert!(!can_manage_departments(&anonymous));
        assert!(!can_create_project(&anonymous, dept));
        assert!(!can_delete_project(&anonymous, dept, dept));
        assert!(!can_create_or_edit_task(&anonymous, dept));
        assert!(!can_delete_task(&anonymous, dept));
        assert!(!can_manage_users(&anonymous));
        assert!(!can_delete_attachment(&anonymous, None));
    }
}
