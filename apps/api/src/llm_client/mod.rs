/// LLM client: the single point of entry for all completion calls in the resume service.
///
/// ARCHITECTURAL RULE: No other module may call the completion endpoint directly.
/// Every AI component depends on the `Completer` trait, implemented here by `PromptClient`.
///
/// Degrade policy: `complete` never fails. Rate limits are retried with a fixed delay; any other
/// failure (network, timeout, non-2xx, malformed body, missing content) is logged and yields `""`.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LlmConfig;

pub mod prompts;
pub mod retry;

pub use retry::{complete_with_retry, RetryPolicy};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited by completion endpoint")]
    RateLimited,

    #[error("Completion response had no message content")]
    EmptyContent,
}

/// Sends a (system role, user prompt, temperature) triple and returns the answer text.
///
/// An empty string means "no result" and must never be treated as valid output.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, system_role: &str, user_prompt: &str, temperature: f32) -> String;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Chat-completions client for an Azure-OpenAI-style deployment.
#[derive(Clone)]
pub struct PromptClient {
    client: Client,
    url: String,
    api_key: String,
    api_version: String,
    policy: RetryPolicy,
}

impl PromptClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/openai/deployments/{}/chat/completions",
                config.endpoint.trim_end_matches('/'),
                config.deployment
            ),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            policy: RetryPolicy {
                max_retries: config.max_retries,
                delay: config.retry_delay,
            },
        })
    }

    /// One request, no retries. Distinguishes rate limiting from every other failure.
    async fn send_once(
        &self,
        system_role: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_role,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl Completer for PromptClient {
    async fn complete(&self, system_role: &str, user_prompt: &str, temperature: f32) -> String {
        complete_with_retry(self.policy, move || {
            self.send_once(system_role, user_prompt, temperature)
        })
        .await
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
