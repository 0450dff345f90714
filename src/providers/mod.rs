/*!
 * Provider implementations for script generation.
 *
 * This module contains client implementations for the supported LLM providers:
 * - Gemini: Google Generative Language API
 * - Ollama: Local LLM server
 * - Mock: Canned responses for tests
 */

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A provider-neutral completion request
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Instructions for the model
    pub system: Option<String>,
    /// User content
    pub prompt: String,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// JSON schema the response must follow, if the provider supports it
    pub response_schema: Option<Value>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Ask for JSON output following `schema`
    pub fn json_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Text returned by a provider along with token accounting
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    pub text: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the script generator.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Human readable provider name for logs
    fn name(&self) -> &str;
}

/// Map a transport failure to a provider error
pub(crate) fn map_request_error(error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Map a non-success HTTP status to a provider error
pub(crate) fn map_status_error(status_code: u16, message: String) -> ProviderError {
    match status_code {
        401 | 403 => ProviderError::AuthenticationError(message),
        _ => ProviderError::ApiError { status_code, message },
    }
}

pub mod gemini;
pub mod mock;
pub mod ollama;
