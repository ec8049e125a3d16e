//! The trigger event: a base branch moved.

use serde::{Deserialize, Serialize};

use super::ids::Sha;

/// A base branch moved to a new tip.
///
/// One event maps to one cascade run. The event is ephemeral: nothing about it
/// is persisted, and everything else the run needs is re-derived from current
/// platform state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseBranchEvent {
    /// The branch that moved (bare name, no `refs/heads/` prefix).
    pub branch: String,

    /// The commit the branch now points to.
    pub tip: Sha,
}

impl BaseBranchEvent {
    pub fn new(branch: impl Into<String>, tip: Sha) -> Self {
        BaseBranchEvent {
            branch: branch.into(),
            tip,
        }
    }
}
