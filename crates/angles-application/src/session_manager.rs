//! Session orchestration.
//!
//! Drives the session state machine around generation calls. The session
//! lock is released while the generator runs; the phase and refining gates
//! in [`Session`] keep overlapping calls out, and the [`CallToken`] from each
//! `begin_*` keeps a reply from before a reset out of the current session.

use std::sync::Arc;

use angles_core::error::Result;
use angles_core::{CallToken, Direction, DraftPost, Session, SessionPhase, SourceInput};
use tokio::sync::RwLock;

use crate::angle_generator::DraftGenerator;

pub struct SessionManager {
    session: Arc<RwLock<Session>>,
    generator: Arc<dyn DraftGenerator>,
}

impl SessionManager {
    pub fn new(generator: Arc<dyn DraftGenerator>) -> Self {
        Self {
            session: Arc::new(RwLock::new(Session::new())),
            generator,
        }
    }

    /// Runs a fresh analysis, replacing any earlier drafts on success.
    ///
    /// On failure the session moves to `Error` and the underlying error is
    /// returned; the user-facing message is available from the session.
    pub async fn analyze(&self, input: SourceInput) -> Result<Vec<DraftPost>> {
        let (session_id, token): (String, CallToken) = {
            let mut session = self.session.write().await;
            let token = session.begin_analysis(input.clone())?;
            (session.id.clone(), token)
        };

        tracing::info!("[Session {}] Analysis started", session_id);
        let outcome = self.generator.generate(&input, None).await;

        let mut session = self.session.write().await;
        session.finish_analysis(token, outcome.clone()).inspect_err(|_| {
            tracing::warn!(
                "[Session {}] Discarding analysis result, session was reset",
                session_id
            );
        })?;

        let drafts = outcome?;
        tracing::info!(
            "[Session {}] Analysis finished with {} draft(s)",
            session_id,
            drafts.len()
        );
        Ok(drafts)
    }

    /// Asks for more drafts in `direction` and merges the unique ones.
    ///
    /// Returns the number of drafts appended. Earlier drafts survive a failure.
    pub async fn refine(&self, direction: Direction) -> Result<usize> {
        let (session_id, token, input, context) = {
            let mut session = self.session.write().await;
            let (token, input, context) = session.begin_refinement(direction)?;
            (session.id.clone(), token, input, context)
        };

        tracing::info!(
            "[Session {}] Refinement ({}) started, excluding {} communities",
            session_id,
            direction,
            context.excluded_communities.len()
        );
        let outcome = self.generator.generate(&input, Some(&context)).await;

        let mut session = self.session.write().await;
        let appended = session
            .finish_refinement(token, outcome.clone())
            .inspect_err(|_| {
                tracing::warn!(
                    "[Session {}] Discarding refinement result, session was reset",
                    session_id
                );
            })?;

        outcome?;
        tracing::info!(
            "[Session {}] Refinement appended {} draft(s)",
            session_id,
            appended
        );
        Ok(appended)
    }

    /// Clears drafts and stored input, returning to `Idle`.
    pub async fn reset(&self) {
        let mut session = self.session.write().await;
        session.reset();
        tracing::info!("[Session {}] Reset", session.id);
    }

    /// A copy of the current session state.
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.session.read().await.phase()
    }

    pub async fn drafts(&self) -> Vec<DraftPost> {
        self.session.read().await.drafts().to_vec()
    }

    /// User-facing message from the last failed call, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.session.read().await.error().map(str::to_string)
    }
}
