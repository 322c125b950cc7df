pub mod draft;
pub mod error;
pub mod refinement;
pub mod session;
pub mod source;

// Re-export common types
pub use draft::{AngleResponse, DraftPost, RiskLevel, community_key};
pub use error::{AnglesError, GenerationError, Result};
pub use refinement::{Direction, RefinementContext};
pub use session::{CallToken, GENERATION_FAILED_MESSAGE, Session, SessionPhase};
pub use source::{MediaAttachment, SourceInput};
