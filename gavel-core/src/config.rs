//! The command configuration document and its resolution rules.
//!
//! A document is a YAML mapping from command name to [`ActionSet`], with
//! optional `issues` and `pulls` sections taking precedence over the flat
//! top-level entries for their context. The document is loaded once per
//! invocation and never mutated.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

use crate::target::TargetKind;

/// A config value that may be written as a single string or a list of
/// strings. Normalized to a slice via [`StringOrSeq::as_slice`] so consumers
/// never branch on the shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringOrSeq {
    One(String),
    Many(Vec<String>),
}

impl StringOrSeq {
    pub fn as_slice(&self) -> &[String] {
        match self {
            StringOrSeq::One(value) => std::slice::from_ref(value),
            StringOrSeq::Many(values) => values,
        }
    }
}

/// Reason recorded when locking a conversation.
///
/// The wire value for `TooHeated` is "too heated" (with a space); the
/// hyphenated spelling is accepted in config files as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LockReason {
    #[serde(rename = "off-topic")]
    OffTopic,
    #[serde(rename = "too heated", alias = "too-heated")]
    TooHeated,
    #[serde(rename = "resolved")]
    Resolved,
    #[serde(rename = "spam")]
    Spam,
}

impl LockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockReason::OffTopic => "off-topic",
            LockReason::TooHeated => "too heated",
            LockReason::Resolved => "resolved",
            LockReason::Spam => "spam",
        }
    }

    /// Parse a lock reason as it appears in event payloads.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off-topic" => Some(LockReason::OffTopic),
            "too heated" | "too-heated" => Some(LockReason::TooHeated),
            "resolved" => Some(LockReason::Resolved),
            "spam" => Some(LockReason::Spam),
            _ => None,
        }
    }
}

/// The bundle of effects configured for one command in one context.
///
/// Every field is optional and any subset may be present; an action set with
/// nothing present is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSet {
    /// Comment body, or several bodies to pick from at random.
    pub comment: Option<StringOrSeq>,
    /// Reactions to attach to the created comment, in listed order.
    pub reactions: Option<StringOrSeq>,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub close: bool,
    #[serde(default)]
    pub lock: bool,
    #[serde(default)]
    pub unlock: bool,
    pub lock_reason: Option<LockReason>,
    /// Label specifiers; `label` and `labels` are both accepted and treated
    /// identically so configs read naturally in singular or plural form.
    pub label: Option<StringOrSeq>,
    pub labels: Option<StringOrSeq>,
    pub assign: Option<StringOrSeq>,
    #[serde(default)]
    pub pin: bool,
    #[serde(default)]
    pub unpin: bool,
    #[serde(default)]
    pub dispatch: bool,
}

impl ActionSet {
    pub fn is_empty(&self) -> bool {
        self == &ActionSet::default()
    }
}

/// Parsed configuration document.
///
/// `issues` and `pulls` map command names to context-specific action sets;
/// the remaining top-level entries form a flat fallback shared by both
/// contexts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub issues: HashMap<String, ActionSet>,
    #[serde(default)]
    pub pulls: HashMap<String, ActionSet>,
    #[serde(flatten)]
    pub shared: HashMap<String, ActionSet>,
}

impl ConfigDocument {
    /// Parse a YAML document.
    ///
    /// A document that parses to something other than a mapping (a bare
    /// scalar, a sequence) degrades to the empty document; only genuine parse
    /// failures and shape mismatches are errors.
    pub fn parse(text: &str) -> Result<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(text).context("Failed to parse configuration document")?;

        if !value.is_mapping() {
            return Ok(Self::default());
        }

        serde_yaml::from_value(value).context("Configuration document has an unexpected shape")
    }

    /// Build a document from optionally-fetched file content. An absent file
    /// is an empty document, not an error.
    pub fn from_fetched(content: Option<&str>) -> Result<Self> {
        match content {
            Some(text) => Self::parse(text),
            None => Ok(Self::default()),
        }
    }

    /// Look up the action set for a command in a context.
    ///
    /// The context-specific section wins; otherwise the flat top-level entry
    /// applies. There is no merging between the two levels. An unknown
    /// command yields the empty action set.
    pub fn resolve(&self, kind: TargetKind, command: &str) -> ActionSet {
        let section = match kind {
            TargetKind::Issue => &self.issues,
            TargetKind::PullRequest => &self.pulls,
        };

        if let Some(actions) = section.get(command) {
            return actions.clone();
        }

        self.shared.get(command).cloned().unwrap_or_default()
    }
}
