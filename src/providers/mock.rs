/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Echoes the document of the unit back
 * - `MockProvider::translating(f)` - Applies `f` to the document of the unit
 * - `MockProvider::scripted(replies)` - Returns fixed replies in order
 * - `MockProvider::scripted_then_failing(replies)` - Fixed replies, then errors
 * - `MockProvider::intermittent(n)` - Fails every Nth request
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{ChatCompletion, ChatMessage, ChatRole, Provider};
use crate::translation::prompts::extract_markdown;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, transforming the unit document
    Working,
    /// Returns the scripted replies, repeating the last one
    Scripted,
    /// Returns the scripted replies, then fails every request
    ScriptedThenFailing,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Simulates slow response (for concurrency testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Transformation applied to the unit document
    transform: fn(&str) -> String,
    /// Remaining scripted replies
    replies: Arc<Mutex<VecDeque<String>>>,
    /// Last scripted reply, repeated once the script is exhausted
    last_reply: Arc<Mutex<Option<String>>>,
    /// Every message history received
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

fn identity(text: &str) -> String {
    text.to_string()
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            transform: identity,
            replies: Arc::new(Mutex::new(VecDeque::new())),
            last_reply: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that echoes the document
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a working mock provider applying `transform` to the document
    pub fn translating(transform: fn(&str) -> String) -> Self {
        let mut provider = Self::working();
        provider.transform = transform;
        provider
    }

    /// Create a mock provider returning fixed replies in order
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new(MockBehavior::Scripted);
        provider
            .replies
            .lock()
            .extend(replies.into_iter().map(Into::into));
        provider
    }

    /// Create a mock provider returning fixed replies, then failing once they run out
    pub fn scripted_then_failing<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut provider = Self::scripted(replies);
        provider.behavior = MockBehavior::ScriptedThenFailing;
        provider
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Message histories received so far
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }

    /// Apply the transformation to the document of the first user turn.
    ///
    /// Corrective turns are ignored so the answer stays about the unit.
    fn transform_document(&self, messages: &[ChatMessage]) -> String {
        let prompt = messages
            .iter()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let document = extract_markdown(prompt).unwrap_or(prompt);
        (self.transform)(document)
    }

    fn next_scripted(&self) -> Result<String, ProviderError> {
        let next = self.replies.lock().pop_front();
        let mut last = self.last_reply.lock();
        if let Some(reply) = next {
            *last = Some(reply);
        }
        last.clone().ok_or(ProviderError::EmptyResponse)
    }

    fn completion(messages: &[ChatMessage], text: String) -> ChatCompletion {
        let prompt_len: usize = messages.iter().map(|m| m.content.len()).sum();
        ChatCompletion {
            prompt_tokens: Some((prompt_len / 4) as u64),
            completion_tokens: Some((text.len() / 4) as u64),
            content: text,
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            transform: self.transform,
            replies: Arc::clone(&self.replies),
            last_reply: Arc::clone(&self.last_reply),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(messages.to_vec());

        match self.behavior {
            MockBehavior::Working => Ok(Self::completion(messages, self.transform_document(messages))),

            MockBehavior::Scripted => Ok(Self::completion(messages, self.next_scripted()?)),

            MockBehavior::ScriptedThenFailing => match self.replies.lock().pop_front() {
                Some(reply) => Ok(Self::completion(messages, reply)),
                None => Err(ProviderError::ConnectionError(format!(
                    "Simulated outage after {} scripted replies",
                    count
                ))),
            },

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::completion(messages, self.transform_document(messages)))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated provider failure".to_string(),
            )),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::completion(messages, self.transform_document(messages)))
            }
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
