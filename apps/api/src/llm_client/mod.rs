/// LLM Client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// Handlers depend on the `ChatCompleter` trait; `LlmClient` is the production
/// implementation against an OpenAI-compatible `/chat/completions` endpoint
/// (DeepSeek by default).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::models::chat::ChatMessage;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Request timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM client is not configured: {0}")]
    NotConfigured(String),
}

/// Anything that can turn a role-tagged message list into one text reply.
///
/// Carried in `AppState` as `Arc<dyn ChatCompleter>`.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl CompletionResponse {
    /// Text of the first choice, if it carries any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single LLM client used by all services.
/// Retries transport failures, timeouts, 429 and 5xx with exponential backoff,
/// all inside one overall deadline.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    max_retries: u32,
    retry_base: Duration,
    deadline: Duration,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?,
            api_key: config.api_key.clone(),
            endpoint: completions_endpoint(&config.base_url),
            model: config.model.clone(),
            max_retries: config.max_retries,
            retry_base: Duration::from_secs(1),
            deadline: Duration::from_secs(config.deadline_secs),
        })
    }

    #[cfg(test)]
    fn with_timings(mut self, retry_base: Duration, deadline: Duration) -> Self {
        self.retry_base = retry_base;
        self.deadline = deadline;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes a raw call to the completion API, returning the full response object.
    pub async fn call(&self, messages: &[ChatMessage]) -> Result<CompletionResponse, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::NotConfigured("LLM_API_KEY is not set".to_string()))?;

        let request_body = CompletionRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let mut attempts = 0;
        let outcome = tokio::time::timeout(
            self.deadline,
            self.call_with_retries(api_key, &request_body, &mut attempts),
        )
        .await;

        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "LLM call exceeded its {}s deadline after {} attempts",
                    self.deadline.as_secs_f32(),
                    attempts
                );
                Err(LlmError::Timeout { attempts })
            }
        }
    }

    async fn call_with_retries(
        &self,
        api_key: &str,
        request_body: &CompletionRequest<'_>,
        attempts: &mut u32,
    ) -> Result<CompletionResponse, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for retry in 0..=self.max_retries {
            if retry > 0 {
                let delay = backoff_delay(self.retry_base, retry);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    retry,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            *attempts = retry + 1;

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .json(request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    warn!("LLM call timed out on attempt {}", *attempts);
                    last_error = Some(LlmError::Timeout {
                        attempts: *attempts,
                    });
                    continue;
                }
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let completion: CompletionResponse = match response.json().await {
                Ok(c) => c,
                Err(e) if e.is_timeout() => {
                    last_error = Some(LlmError::Timeout {
                        attempts: *attempts,
                    });
                    continue;
                }
                Err(e) => return Err(LlmError::Http(e)),
            };

            if let Some(usage) = &completion.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(completion);
        }

        Err(match last_error {
            Some(LlmError::Timeout { .. }) => LlmError::Timeout {
                attempts: *attempts,
            },
            Some(LlmError::Api { status: 429, .. }) | None => LlmError::RateLimited {
                retries: self.max_retries,
            },
            Some(other) => other,
        })
    }
}

#[async_trait]
impl ChatCompleter for LlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let response = self.call(messages).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Exponential backoff before retry `retry` (1-based): 1s, 2s, 4s with a 1s base.
fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base * 2u32.pow(retry.saturating_sub(1).min(5))
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let unfenced = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"));

    match unfenced {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim()),
        None => text,
    }
}
