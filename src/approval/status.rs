use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::user::UserWithDepartment;
use crate::utils::non_blank;

/// An account is approved once both its department and its role are set.
/// Blank strings count as unset.
pub fn is_approved(department_id: Option<&str>, role: Option<&str>) -> bool {
    non_blank(department_id).is_some() && non_blank(role).is_some()
}

/// Body of `GET /api/approval-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStatus {
    pub is_approved: bool,
    pub department_name: Option<String>,
    pub role: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub last_checked: DateTime<Utc>,
}

impl ApprovalStatus {
    /// Status for an account that has no mirror row yet.
    pub fn pending(now: DateTime<Utc>) -> Self {
        Self {
            is_approved: false,
            department_name: None,
            role: None,
            position: None,
            department_id: None,
            last_checked: now,
        }
    }

    pub fn from_user(record: &UserWithDepartment, now: DateTime<Utc>) -> Self {
        let user = &record.user;
        let department_id = user.department_id.map(|id| id.to_string());

        Self {
            is_approved: is_approved(department_id.as_deref(), Some(user.role.as_str())),
            department_name: record.department_name.clone(),
            role: non_blank(Some(user.role.as_str())).map(str::to_string),
            position: non_blank(user.position.as_deref()).map(str::to_string),
            department_id: user.department_id,
            last_checked: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;

    #[test]
    fn approval_requires_department_and_role() {
        let cases = [
            (None, None, false),
            (None, Some("member"), false),
            (Some("dept"), None, false),
            (Some(""), Some("member"), false),
            (Some("dept"), Some(""), false),
            (Some("  "), Some("member"), false),
            (Some("dept"), Some("   "), false),
            (Some("dept"), Some("member"), true),
        ];

        for (department, role, expected) in cases {
            assert_eq!(is_approved(department, role), expected, "{department:?} {role:?}");
        }
    }

    fn record(department_id: Option<Uuid>, role: &str) -> UserWithDepartment {
        let now = Utc::now();
        UserWithDepartment {
            user: User {
                id: "user_1".to_string(),
                email: "a@example.com".to_string(),
                full_name: None,
                role: role.to_string(),
                position: Some(String::new()),
                department_id,
                department_head: false,
                created_at: now,
                updated_at: now,
            },
            department_name: department_id.map(|_| "Survey".to_string()),
        }
    }

    #[test]
    fn status_from_mirror_row() {
        let now = Utc::now();
        let dept = Uuid::new_v4();

        let status = ApprovalStatus::from_user(&record(Some(dept), "member"), now);
        assert!(status.is_approved);
        assert_eq!(status.department_name.as_deref(), Some("Survey"));
        assert_eq!(status.position, None);

        let status = ApprovalStatus::from_user(&record(None, "member"), now);
        assert!(!status.is_approved);

        let status = ApprovalStatus::from_user(&record(Some(dept), ""), now);
        assert!(!status.is_approved);
        assert_eq!(status.role, None);
    }

    #[test]
    fn serializes_in_camel_case() {
        let value = serde_json::to_value(ApprovalStatus::pending(Utc::now())).unwrap();
        assert_eq!(value["isApproved"], false);
        assert!(value.get("departmentName").is_some());
        assert!(value.get("lastChecked").is_some());
    }
}
