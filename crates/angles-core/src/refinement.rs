//! Refinement request parameters.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which way a refinement call should steer community selection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    /// Exact technical, tool-matched or niche communities.
    Narrow,
    /// Tangential, thematic or big-picture communities.
    Broad,
}

/// Context carried into a refinement generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementContext {
    pub direction: Direction,
    /// Communities the service must not target again.
    pub excluded_communities: Vec<String>,
}

impl RefinementContext {
    pub fn new(direction: Direction, excluded_communities: Vec<String>) -> Self {
        Self {
            direction,
            excluded_communities,
        }
    }

    /// Returns true if `community` matches an excluded entry after normalisation.
    pub fn excludes(&self, community: &str) -> bool {
        let key = crate::draft::community_key(community);
        self.excluded_communities
            .iter()
            .any(|excluded| crate::draft::community_key(excluded) == key)
    }
}
