//! Interpretation of a resolved action set into an ordered sequence of
//! effect calls.
//!
//! Steps run in a fixed order: pin/unpin, comment (with its reactions),
//! open/close, lock/unlock, labels, assignees, dispatch. Each step consults
//! the target snapshot to skip effects that would be no-ops. The first
//! failed call aborts the remaining steps; effects already applied are not
//! rolled back.

use anyhow::Result;
use futures_util::future::join_all;
use rand::Rng;
use serde_json::json;
use std::future::Future;
use tracing::{debug, info};

use crate::command::Command;
use crate::config::{ActionSet, StringOrSeq};
use crate::ops::IssueOps;
use crate::target::{IssueState, TargetRef};
use crate::template::{render, RenderContext};

/// Apply a resolved action set to the target through the client.
pub async fn execute<C>(
    client: &C,
    actions: &ActionSet,
    command: &Command,
    target: &TargetRef,
) -> Result<()>
where
    C: IssueOps + ?Sized,
{
    let context = RenderContext::new(&command.args);

    if actions.pin {
        info!("Pinning #{}", target.number);
        client.pin(target).await?;
    }
    if actions.unpin {
        info!("Unpinning #{}", target.number);
        client.unpin(target).await?;
    }

    if let Some(comment) = &actions.comment {
        if let Some(choice) = pick_comment(comment) {
            let body = render(
                choice,
                &context.clone().with_author(target.author_login.as_str()),
            );
            info!("Commenting on #{}", target.number);
            with_lock_released(client, target, async {
                let comment_id = client.create_comment(target, &body).await?;
                if let Some(reactions) = &actions.reactions {
                    for reaction in reactions.as_slice() {
                        client.add_reaction(comment_id, reaction).await?;
                    }
                }
                Ok(())
            })
            .await?;
        }
    }

    if actions.open {
        if target.state == IssueState::Closed {
            info!("Reopening #{}", target.number);
            client.set_state(target, IssueState::Open).await?;
        } else {
            debug!("#{} is already open", target.number);
        }
    }
    if actions.close {
        if target.state == IssueState::Open {
            info!("Closing #{}", target.number);
            client.set_state(target, IssueState::Closed).await?;
        } else {
            debug!("#{} is already closed", target.number);
        }
    }

    if actions.lock {
        if !target.locked {
            info!("Locking #{}", target.number);
            client.lock(target, actions.lock_reason).await?;
        } else {
            debug!("#{} is already locked", target.number);
        }
    }
    if actions.unlock {
        if target.locked {
            info!("Unlocking #{}", target.number);
            client.unlock(target).await?;
        } else {
            debug!("#{} is not locked", target.number);
        }
    }

    // `label` and `labels` are both honored; their specifiers feed the same
    // add/remove sets.
    let label_specs: Vec<&String> = actions
        .label
        .iter()
        .chain(actions.labels.iter())
        .flat_map(|specs| specs.as_slice().iter())
        .collect();
    if !label_specs.is_empty() {
        let sets =
            split_specs(label_specs.into_iter(), &context).resolve_wildcard(&target.labels);

        if !sets.add.is_empty() {
            info!("Adding labels {:?} to #{}", sets.add, target.number);
            client.add_labels(target, &sets.add).await?;
        }
        if !sets.remove.is_empty() {
            info!("Removing labels {:?} from #{}", sets.remove, target.number);
            // Removals have no relative ordering; they run concurrently and
            // the first failure wins when surfacing an error.
            let removals = sets
                .remove
                .iter()
                .map(|label| client.remove_label(target, label));
            join_all(removals)
                .await
                .into_iter()
                .collect::<Result<Vec<()>>>()?;
        }
    }

    if let Some(assign) = &actions.assign {
        let sets = split_specs(assign.as_slice().iter(), &context)
            .strip_handles()
            .resolve_wildcard(&target.assignees);

        if !sets.remove.is_empty() {
            info!("Unassigning {:?} from #{}", sets.remove, target.number);
            client.remove_assignees(target, &sets.remove).await?;
        }
        if !sets.add.is_empty() {
            info!("Assigning {:?} to #{}", sets.add, target.number);
            client.add_assignees(target, &sets.add).await?;
        }
    }

    if actions.dispatch {
        info!("Dispatching repository event \"{}\"", command.name);
        client
            .dispatch_event(&command.name, json!({ "args": command.args }))
            .await?;
    }

    Ok(())
}

/// Run `op` with the target's conversation unlocked.
///
/// Comment creation is rejected on a locked conversation, so a locked target
/// is unlocked first and re-locked afterwards with the reason that was active
/// beforehand. If `op` fails, the lock is not restored; the invocation is
/// already aborting at that point.
pub async fn with_lock_released<C, T, Fut>(client: &C, target: &TargetRef, op: Fut) -> Result<T>
where
    C: IssueOps + ?Sized,
    Fut: Future<Output = Result<T>>,
{
    if !target.locked {
        return op.await;
    }

    client.unlock(target).await?;
    let value = op.await?;
    client.lock(target, target.active_lock_reason).await?;
    Ok(value)
}

fn pick_comment(comment: &StringOrSeq) -> Option<&str> {
    match comment {
        StringOrSeq::One(body) => Some(body.as_str()),
        StringOrSeq::Many(choices) => {
            if choices.is_empty() {
                return None;
            }
            let index = rand::thread_rng().gen_range(0..choices.len());
            Some(choices[index].as_str())
        }
    }
}

/// Rendered specifier tokens, partitioned into additions and removals.
///
/// A specifier is in at most one set: a `-` prefix marks a removal (prefix
/// stripped), a bare `*` is kept in the removal set as the wildcard marker,
/// anything else non-empty is an addition.
#[derive(Debug, Default, PartialEq, Eq)]
struct SpecSets {
    add: Vec<String>,
    remove: Vec<String>,
}

fn split_specs<'a, I>(specs: I, context: &RenderContext) -> SpecSets
where
    I: IntoIterator<Item = &'a String>,
{
    let mut sets = SpecSets::default();
    for spec in specs {
        for token in render(spec, context).split_whitespace() {
            if let Some(name) = token.strip_prefix('-') {
                if !name.is_empty() {
                    sets.remove.push(name.to_string());
                }
            } else if token == "*" {
                sets.remove.push(token.to_string());
            } else {
                sets.add.push(token.to_string());
            }
        }
    }
    sets
}

impl SpecSets {
    /// Replace the removal set wholesale with the target's current set when
    /// it contains the wildcard.
    fn resolve_wildcard(mut self, current: &[String]) -> Self {
        if self.remove.iter().any(|name| name == "*") {
            self.remove = current.to_vec();
        }
        self
    }

    /// Strip a leading `@` from every name, for assignee specifiers.
    fn strip_handles(mut self) -> Self {
        fn strip(names: Vec<String>) -> Vec<String> {
            names
                .into_iter()
                .map(|name| match name.strip_prefix('@') {
                    Some(stripped) => stripped.to_string(),
                    None => name,
                })
                .collect()
        }

        self.add = strip(self.add);
        self.remove = strip(self.remove);
        self
    }
}
