//! Session state for one transcript-to-drafts workflow.

pub mod model;
pub mod phase;

pub use model::{CallToken, GENERATION_FAILED_MESSAGE, Session};
pub use phase::SessionPhase;
