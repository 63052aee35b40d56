use serde::Serialize;
use uuid::Uuid;

use crate::approval::is_approved;
use crate::identity::{Identity, PublicMetadata};

/// Closed set of account roles. Anything else parses to `Unknown`, which no
/// predicate accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Admin,
    Sysadmin,
    Unknown,
}

impl Role {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("member") => Role::Member,
            Some("admin") => Role::Admin,
            Some("sysadmin") => Role::Sysadmin,
            _ => Role::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
            Role::Sysadmin => "sysadmin",
            Role::Unknown => "unknown",
        }
    }
}

/// The identity attempting an operation, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Option<String>,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub is_department_head: bool,
    pub approved: bool,
}

impl Actor {
    /// No session: fails every predicate.
    pub fn anonymous() -> Self {
        Self {
            id: None,
            role: Role::Unknown,
            department_id: None,
            is_department_head: false,
            approved: false,
        }
    }

    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: Some(id.into()),
            role,
            department_id: None,
            is_department_head: false,
            approved: false,
        }
    }

    pub fn with_department(mut self, department_id: Uuid) -> Self {
        self.department_id = Some(department_id);
        self.approved = self.has_known_role();
        self
    }

    pub fn as_department_head(mut self) -> Self {
        self.is_department_head = true;
        self
    }

    pub fn from_metadata(id: impl Into<String>, metadata: &PublicMetadata) -> Self {
        let metadata = metadata.normalized();
        let department_id = metadata
            .department_id
            .as_deref()
            .and_then(|value| Uuid::parse_str(value).ok());

        Self {
            id: Some(id.into()),
            role: Role::parse(metadata.role.as_deref()),
            department_id,
            is_department_head: metadata.is_department_head(),
            approved: is_approved(metadata.department_id.as_deref(), metadata.role.as_deref()),
        }
    }

    pub fn from_identity(identity: &Identity) -> Self {
        Self::from_metadata(identity.id.clone(), &identity.public_metadata)
    }

    pub fn is_sysadmin(&self) -> bool {
        self.role == Role::Sysadmin
    }

    pub fn has_known_role(&self) -> bool {
        self.role != Role::Unknown
    }

    /// Head of `department_id`. A head flag without a department grants nothing.
    pub fn heads(&self, department_id: Option<Uuid>) -> bool {
        match (self.department_id, department_id) {
            (Some(own), Some(target)) => self.heads_any_department() && own == target,
            _ => false,
        }
    }

    /// Head of some department, whichever it is.
    pub fn heads_any_department(&self) -> bool {
        self.has_known_role() && self.is_department_head && self.department_id.is_some()
    }

    pub fn is(&self, identity_id: Option<&str>) -> bool {
        match (self.id.as_deref(), identity_id) {
            (Some(own), Some(other)) => !own.is_empty() && own == other,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_strings_fail_closed() {
        assert_eq!(Role::parse(Some("sysadmin")), Role::Sysadmin);
        assert_eq!(Role::parse(Some("SYSADMIN")), Role::Unknown);
        assert_eq!(Role::parse(Some("root")), Role::Unknown);
        assert_eq!(Role::parse(Some("")), Role::Unknown);
        assert_eq!(Role::parse(None), Role::Unknown);
    }

    #[test]
    fn metadata_with_invalid_department_has_no_scope() {
        let metadata = PublicMetadata {
            role: Some("member".to_string()),
            department_id: Some("not-a-uuid".to_string()),
            department_head: Some(true),
            position: None,
        };
        let actor = Actor::from_metadata("user_1", &metadata);

        assert_eq!(actor.department_id, None);
        assert!(!actor.heads_any_department());
    }

    #[test]
    fn legacy_head_role_maps_to_member_with_flag() {
        let dept = Uuid::new_v4();
        let metadata = PublicMetadata {
            role: Some("department_head".to_string()),
            department_id: Some(dept.to_string()),
            department_head: None,
            position: None,
        };
        let actor = Actor::from_metadata("user_1", &metadata);

        assert_eq!(actor.role, Role::Member);
        assert!(actor.heads(Some(dept)));
        assert!(actor.approved);
    }

    #[test]
    fn anonymous_actor_matches_no_owner() {
        let actor = Actor::anonymous();
        assert!(!actor.is(Some("")));
        assert!(!actor.is(None));
        assert!(!actor.heads(None));
    }
}
