//! Draft posts produced by the generation service.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How promotional a draft reads to the target community.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A single community-targeted post draft.
///
/// Field names on the wire follow the response schema declared to the
/// generation service (`subreddit`, `angleExplanation`, `selfPromotionRisk`).
/// Every field except `flair` is required; a missing one fails deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPost {
    /// Target community, e.g. `r/webdev`.
    #[serde(rename = "subreddit")]
    pub community: String,
    pub title: String,
    /// Post body in markdown.
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flair: Option<String>,
    /// Why this angle fits the community.
    #[serde(rename = "angleExplanation")]
    pub rationale: String,
    #[serde(rename = "selfPromotionRisk")]
    pub risk: RiskLevel,
}

impl DraftPost {
    /// Normalised identifier used for duplicate detection.
    pub fn community_key(&self) -> String {
        community_key(&self.community)
    }

    /// Copy-ready text: title, blank line, body.
    pub fn to_clipboard_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.body)
    }
}

/// Top-level object returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngleResponse {
    pub angles: Vec<DraftPost>,
}

/// Normalises a community identifier so `r/Python`, `/r/python` and `python`
/// compare equal.
pub fn community_key(community: &str) -> String {
    let lower = community.trim().to_lowercase();
    let trimmed = lower.trim_start_matches('/');
    trimmed
        .strip_prefix("r/")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}
