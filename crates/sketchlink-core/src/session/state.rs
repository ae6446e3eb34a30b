//! Session lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a session is in its lifecycle.
///
/// ```text
/// Opening -> AwaitingUser -> Exporting -> Saving -> Closed
///    |                          |           |
///    +-> Failed                 +-> Failed  +-> Saving (failure recorded, retry via commit)
/// ```
///
/// Any state, `Failed` included, moves to `Closed` on host teardown. The
/// session driver stops at the first terminal state, so a torn-down session
/// only reports `Failed` when it failed before the teardown was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// Reading the record and waiting to deliver the initial `load`
    Opening,
    /// `load` delivered; the user is editing
    AwaitingUser,
    /// An export request is in flight
    Exporting,
    /// A write is in flight, or the last write failed
    Saving {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        failure: Option<String>,
    },
    /// Saved, or dismissed by the host
    Closed,
    /// Could not continue; the host should close the surface
    Failed { reason: String },
}

impl SessionState {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::AwaitingUser => "awaiting_user",
            Self::Exporting => "exporting",
            Self::Saving { .. } => "saving",
            Self::Closed => "closed",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns true once no further transition can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed { .. })
    }

    /// Returns true while in `Saving`, whether or not the write failed.
    pub fn is_saving(&self) -> bool {
        matches!(self, Self::Saving { .. })
    }

    /// Reason of the last failed write, while still in `Saving`.
    pub fn save_failure(&self) -> Option<&str> {
        match self {
            Self::Saving { failure } => failure.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
