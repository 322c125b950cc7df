//! Gemini access for Angles.
//!
//! [`GenerativeModel`] is the seam between prompt construction and the
//! network: [`GeminiApiAgent`] implements it over HTTP, tests substitute
//! canned responses.

pub mod config;
pub mod gemini_api_agent;
pub mod request;

pub use config::{DEFAULT_GEMINI_MODEL, GeminiConfig};
pub use gemini_api_agent::GeminiApiAgent;
pub use request::{Content, GenerateContentRequest, GenerationConfig, InlineDataPayload, Part};

use angles_core::GenerationError;
use async_trait::async_trait;

/// A service that answers a `generateContent` request with raw text.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Sends one request and returns the concatenated text of the answer.
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<String, GenerationError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}
