use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::phase::SessionPhase;
use crate::draft::DraftPost;
use crate::error::{AnglesError, Result};
use crate::refinement::{Direction, RefinementContext};
use crate::source::SourceInput;

/// The only failure text shown to users, whatever went wrong underneath.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate angles. Please try again or check your API key.";

/// Identifies the call started by a `begin_*` transition.
///
/// `finish_*` only accepts the token of the most recent call; `reset` and
/// every new `begin_*` invalidate older tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallToken(u64);

/// In-memory state of one analysis session.
///
/// Transitions are explicit methods so every caller goes through the same
/// gates: `begin_*` checks the phase and the in-flight flags, `finish_*`
/// applies the outcome of the generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    phase: SessionPhase,
    drafts: Vec<DraftPost>,
    input: Option<SourceInput>,
    error: Option<String>,
    refining: bool,
    #[serde(default)]
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            phase: SessionPhase::Idle,
            drafts: Vec::new(),
            input: None,
            error: None,
            refining: false,
            generation: 0,
        }
    }

    fn next_token(&mut self) -> CallToken {
        self.generation += 1;
        CallToken(self.generation)
    }

    fn is_current(&self, token: CallToken) -> bool {
        token.0 == self.generation
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn drafts(&self) -> &[DraftPost] {
        &self.drafts
    }

    pub fn input(&self) -> Option<&SourceInput> {
        self.input.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_refining(&self) -> bool {
        self.refining
    }

    /// Community identifiers of every accumulated draft, in order.
    pub fn used_communities(&self) -> Vec<String> {
        self.drafts.iter().map(|d| d.community.clone()).collect()
    }

    /// Moves to `Analyzing` and stores `input` for later refinement calls.
    pub fn begin_analysis(&mut self, input: SourceInput) -> Result<CallToken> {
        if !self.phase.can_begin_analysis() {
            return Err(AnglesError::invalid_state(
                "an analysis is already in progress",
            ));
        }
        if input.transcript.trim().is_empty() {
            return Err(AnglesError::invalid_input("transcript must not be empty"));
        }

        self.phase = SessionPhase::Analyzing;
        self.error = None;
        self.refining = false;
        self.input = Some(input);
        Ok(self.next_token())
    }

    /// Applies the outcome of a fresh generation call.
    ///
    /// Rejects the outcome if `token` is not the current call.
    pub fn finish_analysis(
        &mut self,
        token: CallToken,
        outcome: Result<Vec<DraftPost>>,
    ) -> Result<()> {
        if !self.is_current(token) {
            return Err(AnglesError::invalid_state("stale analysis result"));
        }
        if self.phase != SessionPhase::Analyzing {
            return Err(AnglesError::invalid_state(format!(
                "cannot finish analysis while {}",
                self.phase
            )));
        }

        match outcome {
            Ok(drafts) => {
                self.drafts = drafts;
                self.error = None;
                self.phase = SessionPhase::Results;
            }
            Err(err) => {
                tracing::warn!("[Session {}] Analysis failed: {}", self.id, err);
                self.drafts.clear();
                self.error = Some(GENERATION_FAILED_MESSAGE.to_string());
                self.phase = SessionPhase::Error;
            }
        }
        Ok(())
    }

    /// Marks a refinement as in flight and returns the context to send.
    ///
    /// Returns the stored input too, since the refinement call reuses it.
    pub fn begin_refinement(
        &mut self,
        direction: Direction,
    ) -> Result<(CallToken, SourceInput, RefinementContext)> {
        if self.phase != SessionPhase::Results {
            return Err(AnglesError::invalid_state(format!(
                "refinement requires results, session is {}",
                self.phase
            )));
        }
        if self.refining {
            return Err(AnglesError::invalid_state(
                "a refinement is already in progress",
            ));
        }
        let input = self
            .input
            .clone()
            .ok_or_else(|| AnglesError::invalid_state("no stored input to refine"))?;

        self.refining = true;
        self.error = None;
        Ok((
            self.next_token(),
            input,
            RefinementContext::new(direction, self.used_communities()),
        ))
    }

    /// Merges refinement results, appending only communities not seen yet.
    ///
    /// Returns the number of drafts appended. On failure the accumulated
    /// drafts are kept and the error message is recorded. An outcome whose
    /// token is not the current call is rejected and leaves state untouched.
    pub fn finish_refinement(
        &mut self,
        token: CallToken,
        outcome: Result<Vec<DraftPost>>,
    ) -> Result<usize> {
        if !self.is_current(token) {
            return Err(AnglesError::invalid_state("stale refinement result"));
        }
        if !self.refining {
            return Err(AnglesError::invalid_state("no refinement in progress"));
        }
        self.refining = false;

        let new_drafts = match outcome {
            Ok(drafts) => drafts,
            Err(err) => {
                tracing::warn!("[Session {}] Refinement failed: {}", self.id, err);
                self.error = Some(GENERATION_FAILED_MESSAGE.to_string());
                return Ok(0);
            }
        };

        let mut seen: HashSet<String> = self.drafts.iter().map(|d| d.community_key()).collect();
        let before = self.drafts.len();
        for draft in new_drafts {
            if seen.insert(draft.community_key()) {
                self.drafts.push(draft);
            } else {
                tracing::debug!(
                    "[Session {}] Skipping duplicate community {}",
                    self.id,
                    draft.community
                );
            }
        }

        Ok(self.drafts.len() - before)
    }

    /// Returns to `Idle` from any phase, discarding drafts and stored input.
    pub fn reset(&mut self) {
        self.next_token();
        self.phase = SessionPhase::Idle;
        self.drafts.clear();
        self.input = None;
        self.error = None;
        self.refining = false;
    }
}
