//! Capability surface the executor consumes.
//!
//! Any concrete client satisfying this trait suffices; the production
//! implementation talks to the GitHub REST and GraphQL APIs, tests use an
//! in-memory recording client.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::LockReason;
use crate::target::{IssueState, TargetRef};

#[async_trait]
pub trait IssueOps: Send + Sync {
    /// Create a comment on the target, returning the new comment's id.
    async fn create_comment(&self, target: &TargetRef, body: &str) -> Result<u64>;

    /// Attach a reaction to a comment.
    async fn add_reaction(&self, comment_id: u64, reaction: &str) -> Result<()>;

    /// Transition the target to the given state.
    async fn set_state(&self, target: &TargetRef, state: IssueState) -> Result<()>;

    /// Lock the target's conversation, optionally recording a reason.
    async fn lock(&self, target: &TargetRef, reason: Option<LockReason>) -> Result<()>;

    /// Unlock the target's conversation.
    async fn unlock(&self, target: &TargetRef) -> Result<()>;

    /// Add a batch of labels to the target.
    async fn add_labels(&self, target: &TargetRef, labels: &[String]) -> Result<()>;

    /// Remove a single label from the target.
    async fn remove_label(&self, target: &TargetRef, label: &str) -> Result<()>;

    /// Assign a batch of users to the target.
    async fn add_assignees(&self, target: &TargetRef, assignees: &[String]) -> Result<()>;

    /// Unassign a batch of users from the target.
    async fn remove_assignees(&self, target: &TargetRef, assignees: &[String]) -> Result<()>;

    /// Pin the target issue.
    async fn pin(&self, target: &TargetRef) -> Result<()>;

    /// Unpin the target issue.
    async fn unpin(&self, target: &TargetRef) -> Result<()>;

    /// Emit a repository-level custom event.
    async fn dispatch_event(&self, event_type: &str, payload: serde_json::Value) -> Result<()>;
}
