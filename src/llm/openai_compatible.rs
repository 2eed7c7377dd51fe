// ABOUTME: OpenAI-compatible generation provider with vLLM guided-decoding support
// ABOUTME: Posts chat completions carrying the compiled schema as a guided_json constraint
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # `OpenAI`-Compatible Guided Provider
//!
//! Generic implementation for any `OpenAI`-compatible endpoint that accepts
//! the vLLM `guided_json` extension (vLLM itself, or compatible proxies).
//! The compiled week schema rides along with every completion request so the
//! backend samples only legal routine shapes.
//!
//! ## Configuration
//!
//! - `ROUTINE_LLM_BASE_URL`: Base URL (default: <http://127.0.0.1:8000/v1>)
//! - `ROUTINE_LLM_MODEL`: Model to use (default: `google/gemma-3-4b-it`)
//! - `ROUTINE_LLM_API_KEY`: API key (optional, empty for local servers)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{GenerationProvider, GenerationRequest};
use crate::errors::{AppError, AppResult};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Environment variable for the generation endpoint base URL
const BASE_URL_ENV: &str = "ROUTINE_LLM_BASE_URL";

/// Environment variable for the model name
const MODEL_ENV: &str = "ROUTINE_LLM_MODEL";

/// Environment variable for the API key (optional)
const API_KEY_ENV: &str = "ROUTINE_LLM_API_KEY";

/// Default base URL (local vLLM)
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/v1";

/// Default model for guided generation
const DEFAULT_MODEL: &str = "google/gemma-3-4b-it";

/// Connection timeout for local servers
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Request timeout (guided decoding of a full week can be slow)
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Presence penalty applied to discourage repeated exercise picks
const PRESENCE_PENALTY: f32 = 0.2;

/// Frequency penalty applied to discourage repeated exercise picks
const FREQUENCY_PENALTY: f32 = 0.2;

/// Repetition penalty forwarded to vLLM
const REPETITION_PENALTY: f32 = 1.2;

/// Nucleus sampling cutoff forwarded to vLLM
const TOP_P: f32 = 0.9;

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

/// Chat completion request with vLLM guided-decoding extensions
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<CompletionMessage>,
    temperature: f32,
    max_tokens: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
    // vLLM extensions; compatible servers ignore unknown fields
    guided_json: Value,
    repetition_penalty: f32,
    top_p: f32,
}

/// Message structure for the chat completions API
#[derive(Debug, Serialize)]
struct CompletionMessage {
    role: String,
    content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

/// Choice in response
#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionResponseMessage,
    finish_reason: Option<String>,
}

/// Message in response
#[derive(Debug, Deserialize)]
struct CompletionResponseMessage {
    content: Option<String>,
}

/// Error response structure
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible guided provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g. <http://127.0.0.1:8000/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Model to request
    pub model: String,
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Guided generation provider for `OpenAI`-compatible endpoints
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_env() -> AppResult<Self> {
        let config = OpenAiCompatibleConfig {
            base_url: env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
            api_key: env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            model: env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
        };

        info!(
            base_url = %config.base_url,
            model = %config.model,
            "Initializing guided generation provider"
        );

        Self::new(config)
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }

    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(body) {
            match status.as_u16() {
                400 => AppError::invalid_input(format!(
                    "Generation API rejected the request: {}",
                    parsed.error.message
                )),
                404 => AppError::not_found(format!(
                    "Model or endpoint: {}",
                    parsed.error.message
                )),
                503 => AppError::service_unavailable(format!(
                    "Generation backend unavailable (is the server running?): {}",
                    parsed.error.message
                )),
                _ => AppError::external_service("generator", parsed.error.message),
            }
        } else {
            match status.as_u16() {
                502..=504 => AppError::service_unavailable(
                    "Generation backend is not responding. Is vLLM running?",
                ),
                _ => AppError::external_service(
                    "generator",
                    format!(
                        "API error ({status}): {}",
                        body.chars().take(200).collect::<String>()
                    ),
                ),
            }
        }
    }
}

#[async_trait]
impl GenerationProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<String> {
        let api_request = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![CompletionMessage {
                role: "user".to_owned(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            presence_penalty: PRESENCE_PENALTY,
            frequency_penalty: FREQUENCY_PENALTY,
            guided_json: request.schema.clone(),
            repetition_penalty: REPETITION_PENALTY,
            top_p: TOP_P,
        };

        debug!(
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            max_tokens = request.max_tokens,
            "Sending guided completion request"
        );

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(&api_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send generation request: {e}");
                if e.is_connect() {
                    AppError::service_unavailable(format!(
                        "Cannot connect to generation backend at {}",
                        self.config.base_url
                    ))
                } else {
                    AppError::external_service("generator", format!("Failed to connect: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read generation response: {e}");
            AppError::external_service("generator", format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse generation response: {e} - body: {}",
                body.chars().take(500).collect::<String>()
            );
            AppError::external_service("generator", format!("Failed to parse response: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service("generator", "API returned no choices"))?;

        let content = choice.message.content.unwrap_or_default();
        debug!(
            chars = content.len(),
            finish_reason = ?choice.finish_reason,
            "Received guided completion"
        );

        Ok(content)
    }
}
