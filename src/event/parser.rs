//! Push payload decoding.
//!
//! The CI runner invokes the bot with the triggering push event already
//! delivered as a JSON file on disk (`$GITHUB_EVENT_PATH` under GitHub
//! Actions). Only branch pushes are triggers: tag pushes and branch
//! deletions carry nothing to cascade.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::{BaseBranchEvent, Sha};

/// Errors from loading a trigger payload.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("failed to read event payload {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("event payload {} is not valid JSON", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The payload parsed but isn't a branch push (tag push, branch
    /// deletion, or a different event type entirely).
    #[error("event payload {} is not a branch push", path.display())]
    NotABranchPush { path: PathBuf },
}

/// Loads and decodes a push event payload from disk.
pub fn load_push_event(path: &Path) -> Result<BaseBranchEvent, TriggerError> {
    let raw = std::fs::read(path).map_err(|source| TriggerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let payload: serde_json::Value =
        serde_json::from_slice(&raw).map_err(|source| TriggerError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    parse_push_payload(&payload).ok_or_else(|| TriggerError::NotABranchPush {
        path: path.to_path_buf(),
    })
}

/// Decodes a push payload into a `BaseBranchEvent`.
///
/// Returns `None` for anything that isn't a branch moving to a real commit:
/// tag pushes, branch deletions (`deleted: true`, or an all-zero `after`
/// SHA), and payloads of other event types.
pub fn parse_push_payload(payload: &serde_json::Value) -> Option<BaseBranchEvent> {
    if payload.get("deleted").and_then(|d| d.as_bool()) == Some(true) {
        return None;
    }

    let git_ref = payload.get("ref")?.as_str()?;
    let branch = git_ref.strip_prefix("refs/heads/")?;
    if branch.is_empty() {
        return None;
    }

    let after = payload.get("after")?.as_str()?;
    let tip = Sha::parse(after).ok()?;
    if tip.is_zero() {
        return None;
    }

    Some(BaseBranchEvent::new(branch, tip))
}
