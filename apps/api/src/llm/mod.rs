//! Generation backend — the single point of entry for all LLM calls.
//!
//! The backend supplies conversational phrasing only; it never drives the
//! conversation state machine. Every caller must be prepared for it to fail
//! and fall back to templated text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default bound on a single generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REPLY_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("generation request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("backend returned empty content")]
    EmptyContent,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(e)
        }
    }
}

/// One phrasing request: a system instruction describing the assistant's role
/// at the current stage, and the user-facing prompt with conversation context.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
}

/// Capability interface over "produce response text within a timeout, or
/// fail". Implementations are selected once at startup.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;

    /// Backend identifier, for startup logging only.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
    top_p: f32,
    repeat_penalty: f32,
    stop: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

/// Local model server backend speaking the Ollama generate API.
#[derive(Clone)]
pub struct OllamaBackend {
    client: Client,
    url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(url: String, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            url,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let full_prompt = build_prompt(&request.system, &request.prompt);
        let body = OllamaRequest {
            model: &self.model,
            prompt: &full_prompt,
            stream: false,
            options: OllamaOptions {
                temperature: TEMPERATURE,
                num_predict: MAX_REPLY_TOKENS,
                top_p: 0.9,
                repeat_penalty: 1.1,
                stop: vec!["User:", "System:"],
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OllamaResponse = response.json().await?;
        let text = clean_response(&parsed.response);
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!("generation succeeded ({} chars)", text.len());
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

/// Builds the chat-shaped prompt the local model expects.
fn build_prompt(system: &str, prompt: &str) -> String {
    format!("System: {system}\n\nUser: {prompt}\n\nAssistant:")
}

/// Strips role markers the model sometimes echoes and collapses whitespace.
fn clean_response(raw: &str) -> String {
    raw.replace("System:", "")
        .replace("User:", "")
        .replace("Assistant:", "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
