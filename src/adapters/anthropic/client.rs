//! Anthropic Claude chat client

use super::models::{ErrorEnvelope, MessagesRequest, MessagesResponse};
use crate::config::{AnthropicConfig, SecretString};
use crate::core::ports::LlmClient;
use crate::domain::{ChatMessage, LlmError, OptimedError, Result};
use crate::log_adapter_request;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Path of the Messages endpoint relative to `base_url`
pub const MESSAGES_PATH: &str = "/v1/messages";

/// [`LlmClient`] backed by the Anthropic Messages API
///
/// # Example
///
/// ```no_run
/// use optimed::adapters::anthropic::AnthropicClient;
/// use optimed::config::AnthropicConfig;
/// use optimed::core::ports::LlmClient;
/// use optimed::domain::ChatMessage;
///
/// # async fn example() -> optimed::domain::Result<()> {
/// let client = AnthropicClient::new(AnthropicConfig::default())?;
/// let reply = client.chat(&[ChatMessage::user("Hello")], 0.7, None).await?;
/// println!("{}", reply.content());
/// # Ok(())
/// # }
/// ```
pub struct AnthropicClient {
    endpoint: String,
    api_key: SecretString,
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Create a client from configuration
    ///
    /// The API key comes from `anthropic.api_key`, else `ANTHROPIC_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::AuthenticationFailed`] when no key is available and
    /// a configuration error when the HTTP client cannot be built.
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| {
                OptimedError::Llm(LlmError::AuthenticationFailed(
                    "No Anthropic API key configured; set anthropic.api_key or ANTHROPIC_API_KEY"
                        .to_string(),
                ))
            })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                OptimedError::Configuration(format!("Failed to build Anthropic HTTP client: {e}"))
            })?;

        let endpoint = format!("{}{}", config.base_url.trim_end_matches('/'), MESSAGES_PATH);

        Ok(Self {
            endpoint,
            api_key,
            client,
            config,
        })
    }

    /// Full URL of the Messages endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<ChatMessage> {
        let request = MessagesRequest::from_transcript(
            &self.config.model,
            messages,
            temperature,
            max_tokens.unwrap_or(self.config.max_tokens),
        )?;

        log_adapter_request!("anthropic", "POST", self.endpoint);

        let api_key: &str = self.api_key.expose_secret().as_ref();

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let resp = check_status(resp).await?;

        let body: MessagesResponse = resp.json().await.map_err(|e| {
            OptimedError::Llm(LlmError::InvalidResponse(format!(
                "Failed to decode Messages response: {e}"
            )))
        })?;

        tracing::info!(
            model = %self.config.model,
            response_id = %body.id,
            input_tokens = body.usage.input_tokens,
            output_tokens = body.usage.output_tokens,
            "Chat completion received"
        );

        body.into_chat_message(&self.config.model)
    }
}

fn map_transport_error(e: reqwest::Error) -> OptimedError {
    if e.is_timeout() {
        OptimedError::Llm(LlmError::Timeout(e.to_string()))
    } else {
        OptimedError::Llm(LlmError::ConnectionFailed(e.to_string()))
    }
}

/// Maps a non-success status to the matching [`LlmError`] kind
async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let retry_after = resp
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let raw = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&raw)
        .map(|env| env.error.message)
        .unwrap_or(raw);

    tracing::warn!(status = status.as_u16(), message = %message, "Anthropic request failed");

    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthenticationFailed(message),
        StatusCode::TOO_MANY_REQUESTS => {
            LlmError::RateLimitExceeded(retry_after.unwrap_or_else(|| "unknown".to_string()))
        }
        s if s.is_server_error() => LlmError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => LlmError::ClientError {
            status: s.as_u16(),
            message,
        },
    };
    Err(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_new_builds_endpoint() {
        let config = AnthropicConfig {
            base_url: "https://api.anthropic.com/".to_string(),
            api_key: Some(secret_string("sk-test".to_string())),
            ..Default::default()
        };
        let client = AnthropicClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "https://api.anthropic.com/v1/messages");
    }
}
