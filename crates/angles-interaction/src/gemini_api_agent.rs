//! GeminiApiAgent - Direct REST API implementation for Gemini.
//!
//! Calls `models/{model}:generateContent` and returns the first text part of
//! the response. Configuration comes from [`GeminiConfig`].

use angles_core::GenerationError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::GenerativeModel;
use crate::config::GeminiConfig;
use crate::request::{GenerateContentRequest, GenerateContentResponse};

/// Agent implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiApiAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiApiAgent")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::from_config(GeminiConfig {
            api_key: Some(api_key.into()),
            model: model.into(),
            ..GeminiConfig::default()
        })
    }

    pub fn from_config(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key,
            model: config.model,
            base_url: config.base_url,
        }
    }

    /// Reads the API key from the environment (or secret.json).
    ///
    /// Never fails: a missing key surfaces as a transport error on the first call.
    pub fn from_env() -> Self {
        Self::from_config(GeminiConfig::from_env())
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Replaces the HTTP client (custom timeouts, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Points the agent at a different endpoint root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GenerationError::transport(
                None,
                "Gemini API key not configured (set GEMINI_API_KEY or API_KEY)",
            )
        })?;

        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        tracing::debug!("[Gemini] POST {} (model={})", url, self.model);

        let response = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(|err| {
                GenerationError::transport(
                    err.status().map(|s| s.as_u16()),
                    format!("Gemini API request failed: {err}"),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let body_text = response.text().await.map_err(|err| {
            GenerationError::transport(None, format!("Failed to read Gemini response: {err}"))
        })?;

        let parsed: GenerateContentResponse = serde_json::from_str(&body_text).map_err(|err| {
            GenerationError::malformed(format!("Failed to parse Gemini envelope: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl GenerativeModel for GeminiApiAgent {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<String, GenerationError> {
        self.send_request(request).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

/// Concatenates the text parts of the first candidate.
///
/// A response without any text maps to `EmptyResponse`.
fn extract_text_response(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

fn map_http_error(status: StatusCode, body: String) -> GenerationError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    GenerationError::transport(Some(status.as_u16()), message)
}
