use serde::Serialize;

use super::status::ApprovalStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    #[default]
    Unauthenticated,
    Checking,
    PendingApproval,
    Approved,
}

/// Client-side view of an account's approval.
///
/// `Unauthenticated -> Checking -> {PendingApproval, Approved}`, with
/// `PendingApproval -> Checking` on every re-poll. Nothing leaves `Approved`
/// except [`ApprovalMachine::sign_out`]. A failed check never approves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApprovalMachine {
    state: ApprovalState,
    last_status: Option<ApprovalStatus>,
    last_error: Option<String>,
}

impl ApprovalMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ApprovalState {
        self.state
    }

    pub fn last_status(&self) -> Option<&ApprovalStatus> {
        self.last_status.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_approved(&self) -> bool {
        self.state == ApprovalState::Approved
    }

    pub fn session_established(&mut self) -> bool {
        if self.state != ApprovalState::Unauthenticated {
            return false;
        }
        self.state = ApprovalState::Checking;
        true
    }

    /// Returns `false` when no check should run: signed out or already approved.
    pub fn begin_check(&mut self) -> bool {
        match self.state {
            ApprovalState::Checking | ApprovalState::PendingApproval => {
                self.state = ApprovalState::Checking;
                true
            }
            ApprovalState::Unauthenticated | ApprovalState::Approved => false,
        }
    }

    /// Results arriving outside `Checking` (e.g. after a sign-out) are dropped.
    pub fn record_status(&mut self, status: ApprovalStatus) {
        if self.state != ApprovalState::Checking {
            return;
        }

        self.state = if status.is_approved {
            ApprovalState::Approved
        } else {
            ApprovalState::PendingApproval
        };
        self.last_status = Some(status);
        self.last_error = None;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        if self.state != ApprovalState::Checking {
            return;
        }

        if self.last_status.is_some() {
            self.state = ApprovalState::PendingApproval;
        }
        self.last_error = Some(message.into());
    }

    pub fn sign_out(&mut self) {
        *self = Self::default();
    }
}
