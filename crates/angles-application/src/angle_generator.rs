//! Angle Generator
//!
//! Builds the multimodal generation request from source material, sends it
//! through a [`GenerativeModel`] and validates the answer into drafts.

use std::sync::Arc;

use angles_core::error::{GenerationError, Result};
use angles_core::{AngleResponse, DraftPost, RefinementContext, SourceInput};
use angles_interaction::{GenerateContentRequest, GenerationConfig, GenerativeModel, Part};
use async_trait::async_trait;

use crate::prompts::{SYSTEM_INSTRUCTION, render_instruction, response_schema};

/// Anything that can turn source material into drafts.
///
/// Implemented by [`AngleGenerator`]; the session manager depends on this
/// trait so orchestration can be exercised without a model.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    /// Returns only newly produced drafts, never the accumulated history.
    async fn generate(
        &self,
        input: &SourceInput,
        refinement: Option<&RefinementContext>,
    ) -> Result<Vec<DraftPost>>;
}

/// Generation client on top of a [`GenerativeModel`].
pub struct AngleGenerator {
    model: Arc<dyn GenerativeModel>,
}

impl AngleGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Assembles the request: optional inline media first, then the instruction text.
    pub fn build_request(
        &self,
        input: &SourceInput,
        refinement: Option<&RefinementContext>,
    ) -> Result<GenerateContentRequest> {
        let mut parts = Vec::with_capacity(2);
        if let Some(media) = &input.media {
            parts.push(Part::inline_data(&media.mime_type, &media.data));
        }
        parts.push(Part::text(render_instruction(input, refinement)?));

        Ok(GenerateContentRequest::user(parts)
            .with_system_instruction(SYSTEM_INSTRUCTION)
            .with_generation_config(GenerationConfig::json_with_schema(response_schema())))
    }
}

/// Parses the service payload against the declared schema.
pub fn parse_drafts(text: &str) -> std::result::Result<Vec<DraftPost>, GenerationError> {
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    let response: AngleResponse =
        serde_json::from_str(text).map_err(|e| GenerationError::malformed(e.to_string()))?;
    Ok(response.angles)
}

/// Drops drafts that target an excluded community.
pub fn filter_excluded(drafts: Vec<DraftPost>, refinement: &RefinementContext) -> Vec<DraftPost> {
    drafts
        .into_iter()
        .filter(|draft| {
            let excluded = refinement.excludes(&draft.community);
            if excluded {
                tracing::debug!(
                    "[AngleGenerator] Dropping repeated community {}",
                    draft.community
                );
            }
            !excluded
        })
        .collect()
}

#[async_trait]
impl DraftGenerator for AngleGenerator {
    async fn generate(
        &self,
        input: &SourceInput,
        refinement: Option<&RefinementContext>,
    ) -> Result<Vec<DraftPost>> {
        let request = self.build_request(input, refinement)?;

        tracing::info!(
            "[AngleGenerator] Requesting drafts from {} (media: {}, refinement: {})",
            self.model.model_name(),
            input.media.as_ref().map_or("none", |m| m.mime_type.as_str()),
            refinement.map_or("none".to_string(), |r| r.direction.to_string()),
        );

        let outcome = self
            .model
            .generate_content(&request)
            .await
            .and_then(|text| parse_drafts(&text));

        let drafts = outcome.map_err(|err| {
            tracing::error!(
                kind = err.kind(),
                "[AngleGenerator] Generation failed: {}",
                err
            );
            err
        })?;

        let drafts = match refinement {
            Some(ctx) => filter_excluded(drafts, ctx),
            None => drafts,
        };

        tracing::info!("[AngleGenerator] Received {} draft(s)", drafts.len());
        Ok(drafts)
    }
}
