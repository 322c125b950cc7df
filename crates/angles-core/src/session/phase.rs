//! Lifecycle phase of an analysis session.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Where a session is in the `Idle → Analyzing → Results` flow.
///
/// `Error` is only entered from `Analyzing`. Refinement does not change the
/// phase; it is tracked separately by the session's `refining` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionPhase {
    /// Waiting for source material.
    #[default]
    Idle,
    /// A fresh generation call is in flight.
    Analyzing,
    /// Drafts are available; refinement is allowed.
    Results,
    /// The last fresh generation failed.
    Error,
}

impl SessionPhase {
    /// Returns true if a fresh analysis may start from this phase.
    pub fn can_begin_analysis(self) -> bool {
        !matches!(self, Self::Analyzing)
    }
}
