//! Account approval: the derived `is_approved` predicate, the status contract
//! served at `/api/approval-status`, and the client-side state machine with its
//! poller.

mod machine;
mod poller;
mod status;

pub use machine::{ApprovalMachine, ApprovalState};
pub use poller::{ApprovalPoller, HttpStatusSource, StatusSource, DEFAULT_POLL_INTERVAL};
pub use status::{is_approved, ApprovalStatus};
