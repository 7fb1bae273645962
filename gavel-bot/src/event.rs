//! The triggering `issue_comment` event payload and its validation.

use serde::Deserialize;
use tracing::{debug, warn};

use gavel_core::config::LockReason;
use gavel_core::target::{IssueState, TargetKind, TargetRef};

/// The character that marks a comment line as a command.
pub const TRIGGER: char = '/';

#[derive(Debug, Deserialize)]
pub struct CommentEvent {
    pub action: Option<String>,
    pub comment: Option<Comment>,
    pub issue: Option<SubjectPayload>,
    pub pull_request: Option<SubjectPayload>,
}

#[derive(Debug, Deserialize)]
pub struct Comment {
    pub body: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct Label {
    pub name: String,
}

/// The issue or pull request object carried in the payload.
#[derive(Debug, Deserialize)]
pub struct SubjectPayload {
    pub number: u64,
    pub node_id: String,
    pub state: IssueState,
    #[serde(default)]
    pub locked: bool,
    pub active_lock_reason: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<User>,
    pub user: User,
}

impl SubjectPayload {
    fn into_target(self, kind: TargetKind) -> TargetRef {
        TargetRef {
            number: self.number,
            node_id: self.node_id,
            kind,
            state: self.state,
            locked: self.locked,
            active_lock_reason: self
                .active_lock_reason
                .as_deref()
                .and_then(LockReason::parse),
            labels: self.labels.into_iter().map(|label| label.name).collect(),
            assignees: self.assignees.into_iter().map(|user| user.login).collect(),
            author_login: self.user.login,
        }
    }
}

/// A validated invocation: the target snapshot plus the command line with
/// its trigger character already stripped.
#[derive(Debug)]
pub struct Invocation {
    pub target: TargetRef,
    pub command_line: String,
}

impl CommentEvent {
    /// Validate the payload and extract the invocation.
    ///
    /// Anything that disqualifies the event (wrong action, missing subject,
    /// first line not a command) is logged and yields `None`; none of these
    /// are errors.
    pub fn into_invocation(self) -> Option<Invocation> {
        if self.action.as_deref() != Some("created") {
            warn!(
                "Only the created action is supported, got {:?}",
                self.action
            );
            return None;
        }

        let Some(comment) = self.comment else {
            warn!("Event payload has no comment");
            return None;
        };

        let (kind, subject) = match (self.issue, self.pull_request) {
            (Some(issue), _) => (TargetKind::Issue, issue),
            (None, Some(pull)) => (TargetKind::PullRequest, pull),
            (None, None) => {
                warn!("Event payload has neither an issue nor a pull request");
                return None;
            }
        };

        let Some(command_line) = first_command_line(&comment.body) else {
            debug!("The first line of the comment is not a command");
            return None;
        };

        Some(Invocation {
            target: subject.into_target(kind),
            command_line: command_line.to_string(),
        })
    }
}

/// The first line of a comment body with the trigger character stripped, if
/// that line is a command.
///
/// A command line starts with the trigger character and has at least one
/// character after it.
fn first_command_line(body: &str) -> Option<&str> {
    let first_line = body.lines().next()?.trim();
    if first_line.len() < 2 {
        return None;
    }
    first_line.strip_prefix(TRIGGER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(body: &str) -> CommentEvent {
        let value = serde_json::json!({
            "action": "created",
            "comment": {
                "body": body,
                "user": { "login": "commenter" }
            },
            "issue": {
                "number": 12,
                "node_id": "I_abc123",
                "state": "open",
                "locked": true,
                "active_lock_reason": "too heated",
                "labels": [ { "name": "bug" } ],
                "assignees": [ { "login": "alice" } ],
                "user": { "login": "author" }
            }
        });
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_into_invocation_builds_target_from_issue() {
        let invocation = payload("/close now\nsecond line").into_invocation().unwrap();
        assert_eq!(invocation.command_line, "close now");

        let target = invocation.target;
        assert_eq!(target.number, 12);
        assert_eq!(target.kind, TargetKind::Issue);
        assert_eq!(target.state, IssueState::Open);
        assert!(target.locked);
        assert_eq!(target.active_lock_reason, Some(LockReason::TooHeated));
        assert_eq!(target.labels, vec!["bug".to_string()]);
        assert_eq!(target.assignees, vec!["alice".to_string()]);
        assert_eq!(target.author_login, "author");
        assert_eq!(target.node_id, "I_abc123");
    }

    #[test]
    fn test_pull_request_payload_selects_pulls_context() {
        let value = serde_json::json!({
            "action": "created",
            "comment": { "body": "/merge", "user": { "login": "c" } },
            "pull_request": {
                "number": 3,
                "node_id": "PR_x",
                "state": "open",
                "locked": false,
                "active_lock_reason": null,
                "labels": [],
                "assignees": [],
                "user": { "login": "author" }
            }
        });
        let event: CommentEvent = serde_json::from_value(value).unwrap();
        let invocation = event.into_invocation().unwrap();
        assert_eq!(invocation.target.kind, TargetKind::PullRequest);
    }

    #[test]
    fn test_non_created_action_is_rejected() {
        let mut event = payload("/close");
        event.action = Some("edited".to_string());
        assert!(event.into_invocation().is_none());

        let mut event = payload("/close");
        event.action = None;
        assert!(event.into_invocation().is_none());
    }

    #[test]
    fn test_missing_subject_is_rejected() {
        let mut event = payload("/close");
        event.issue = None;
        assert!(event.into_invocation().is_none());
    }

    #[test]
    fn test_first_command_line_rules() {
        assert_eq!(first_command_line("/close now"), Some("close now"));
        assert_eq!(first_command_line("  /close  "), Some("close"));
        assert_eq!(first_command_line("/close\r\nrest"), Some("close"));
        assert_eq!(first_command_line("plain comment"), None);
        assert_eq!(first_command_line("/"), None, "trigger alone is not a command");
        assert_eq!(first_command_line(""), None);
        assert_eq!(
            first_command_line("hello\n/close"),
            None,
            "only the first line is considered"
        );
    }

    #[test]
    fn test_unknown_lock_reason_maps_to_none() {
        let value = serde_json::json!({
            "action": "created",
            "comment": { "body": "/x y", "user": { "login": "c" } },
            "issue": {
                "number": 1,
                "node_id": "I_1",
                "state": "closed",
                "locked": true,
                "active_lock_reason": "mysterious",
                "labels": [],
                "assignees": [],
                "user": { "login": "a" }
            }
        });
        let event: CommentEvent = serde_json::from_value(value).unwrap();
        let invocation = event.into_invocation().unwrap();
        assert_eq!(invocation.target.active_lock_reason, None);
    }
}
