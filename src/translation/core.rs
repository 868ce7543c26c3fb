/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, which owns the chat
 * provider selected in the configuration and adds client-side rate limiting
 * and token accounting on top of it.
 */

use anyhow::Result;
use log::debug;
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::ProviderError;
use crate::providers::anthropic::Anthropic;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;
use crate::providers::{ChatCompletion, ChatMessage, Provider};
use super::prompts::TranslationPromptBuilder;
use super::retry::RetryPolicy;

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of provider calls
    pub requests: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self::with_provider_info(String::new(), String::new())
    }

    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            requests: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Record one provider call
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        self.requests += 1;

        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        // Use the API duration for rate calculation, with fallback to elapsed time
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        let elapsed_minutes = self.start_time.elapsed().as_secs_f64() / 60.0;
        let api_minutes = self.api_duration.as_secs_f64() / 60.0;

        format!(
            "Token Usage Summary:\n\
             Provider: {}\n\
             Model: {}\n\
             Requests: {}\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             Elapsed time: {:.2} minutes\n\
             API request time: {:.2} minutes\n\
             Tokens per minute: {:.2}",
            self.provider,
            self.model,
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            elapsed_minutes,
            api_minutes,
            self.tokens_per_minute()
        )
    }
}

/// Translation service shared by every file of a run
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: Arc<dyn Provider>,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    /// Minimum spacing between two provider calls
    min_interval: Duration,

    /// Time of the last provider call
    last_request: Mutex<Option<Instant>>,

    /// Accumulated token usage
    token_usage: SyncMutex<TokenUsageStats>,
}

impl TranslationService {
    /// Create a new translation service with the provider named in the configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let model = config.get_model();
        let endpoint = config.get_endpoint();
        let temperature = config.common.temperature;
        let timeout_secs = config.get_timeout_secs();

        let provider: Arc<dyn Provider> = match config.provider {
            ConfigTranslationProvider::Ollama => {
                Arc::new(Ollama::new(&endpoint, model, temperature, timeout_secs)?)
            }
            ConfigTranslationProvider::OpenAI => Arc::new(OpenAI::new(
                config.get_api_key(),
                &endpoint,
                model,
                temperature,
                timeout_secs,
            )?),
            ConfigTranslationProvider::LMStudio => {
                // LM Studio often doesn't require an API key; use a default if empty
                let api_key = {
                    let k = config.get_api_key();
                    if k.is_empty() { "lm-studio".to_string() } else { k }
                };
                Arc::new(
                    OpenAI::new(api_key, &endpoint, model, temperature, timeout_secs)?.with_name("LM Studio"),
                )
            }
            ConfigTranslationProvider::Anthropic => Arc::new(Anthropic::new(
                config.get_api_key(),
                &endpoint,
                model,
                temperature,
                timeout_secs,
            )?),
        };

        Ok(Self::with_provider(provider, config))
    }

    /// Create a service around an existing provider
    pub fn with_provider(provider: Arc<dyn Provider>, config: TranslationConfig) -> Self {
        let min_interval = Self::min_interval(&config);
        let token_usage = TokenUsageStats::with_provider_info(provider.name().to_string(), config.get_model());

        Self {
            provider,
            config,
            min_interval,
            last_request: Mutex::new(None),
            token_usage: SyncMutex::new(token_usage),
        }
    }

    /// Spacing implied by the fixed delay and the requests-per-minute limit.
    fn min_interval(config: &TranslationConfig) -> Duration {
        let delay = Duration::from_millis(config.common.rate_limit_delay_ms);
        let per_minute = config
            .get_rate_limit()
            .filter(|&rpm| rpm > 0)
            .map(|rpm| Duration::from_millis(60_000 / rpm as u64))
            .unwrap_or(Duration::ZERO);
        delay.max(per_minute)
    }

    /// Wait until the next call is allowed and reserve the slot.
    async fn throttle(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Rate limiting: waiting {:?} before next request", wait);
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Send a message history to the provider.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ProviderError> {
        self.throttle().await;

        let start = Instant::now();
        let result = self.provider.chat(messages).await;
        let duration = start.elapsed();

        let mut usage = self.token_usage.lock();
        usage.api_duration += duration;
        match &result {
            Ok(completion) => usage.add_token_usage(completion.prompt_tokens, completion.completion_tokens),
            Err(_) => usage.add_token_usage(None, None),
        }

        result
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.provider.test_connection().await
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Snapshot of the token usage so far
    pub fn token_usage(&self) -> TokenUsageStats {
        self.token_usage.lock().clone()
    }

    /// Retry policy for unit conversations
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.common)
    }

    /// Prompt builder for a target language display name
    pub fn prompt_builder(&self, language: &str) -> TranslationPromptBuilder {
        TranslationPromptBuilder::new(language)
            .with_templates(&self.config.common.system_prompt, &self.config.common.user_prompt)
    }

    /// Upper bound of the conversation length for one unit
    pub fn max_history_messages(&self) -> usize {
        self.config.common.max_history_messages
    }
}
