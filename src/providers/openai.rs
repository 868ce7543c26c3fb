use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use super::{error_from_response, error_from_transport, normalize_endpoint, ChatCompletion, ChatMessage, Provider};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// OpenAI client, also used for OpenAI-compatible local servers (LM Studio)
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, without trailing slash
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Display name used in logs
    name: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl OpenAIRequest {
    pub fn new(model: impl Into<String>, messages: &[ChatMessage], temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: messages.to_vec(),
            temperature,
            max_tokens: None,
        }
    }

    /// Set the maximum number of tokens to generate
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: &str,
        model: impl Into<String>,
        temperature: f32,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: normalize_endpoint(endpoint, DEFAULT_ENDPOINT)?,
            model: model.into(),
            temperature,
            name: "OpenAI".to_string(),
        })
    }

    /// Rename the client for logs (e.g. "LM Studio")
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Complete a chat request
    pub async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| error_from_transport(&self.name, e))?;

        if !response.status().is_success() {
            return Err(error_from_response(&self.name, response).await);
        }

        response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("{} response: {}", self.name, e)))
    }

    /// Extract text from an OpenAI response
    pub fn extract_text(response: &OpenAIResponse) -> Option<String> {
        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ProviderError> {
        let request = OpenAIRequest::new(&self.model, messages, self.temperature);
        let response = self.complete(request).await?;

        let content = Self::extract_text(&response).ok_or(ProviderError::EmptyResponse)?;
        let (prompt_tokens, completion_tokens) = match response.usage.as_ref() {
            Some(usage) => (Some(usage.prompt_tokens as u64), Some(usage.completion_tokens as u64)),
            None => (None, None),
        };

        Ok(ChatCompletion {
            content,
            prompt_tokens,
            completion_tokens,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
