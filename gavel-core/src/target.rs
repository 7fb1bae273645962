/// The issue or pull request a triggering comment belongs to.
use serde::Deserialize;

use crate::config::LockReason;

/// Which configuration section applies to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Issue,
    PullRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

/// Read-only snapshot of the target, taken from the triggering event payload.
///
/// The executor consults this state when deciding which effects are no-ops;
/// it never mutates it.
#[derive(Debug, Clone)]
pub struct TargetRef {
    pub number: u64,
    /// Opaque node identifier, required by the pin/unpin mutations.
    pub node_id: String,
    pub kind: TargetKind,
    pub state: IssueState,
    pub locked: bool,
    pub active_lock_reason: Option<LockReason>,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    /// Login of the user who opened the target, exposed to comment templates
    /// as `author`.
    pub author_login: String,
}
