//! Chat command implementation
//!
//! One round trip to the configured language model.

use crate::adapters::anthropic::AnthropicClient;
use crate::cli::{exit_code_for, EXIT_SUCCESS};
use crate::config::OptimedConfig;
use crate::core::ports::LlmClient;
use crate::domain::ChatMessage;
use crate::log_error_with_context;
use clap::Args;

/// Arguments for the chat command
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// User prompt
    pub prompt: String,

    /// Optional system instruction sent before the prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Sampling temperature (0.0 - 1.0)
    #[arg(short, long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Reply length cap; defaults to anthropic.max_tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl ChatArgs {
    /// Transcript sent to the model
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.system
            .iter()
            .map(ChatMessage::system)
            .chain(std::iter::once(ChatMessage::user(self.prompt.as_str())))
            .collect()
    }

    /// Execute the chat command
    pub async fn execute(&self, config: &OptimedConfig) -> anyhow::Result<i32> {
        tracing::info!(model = %config.anthropic.model, "Sending chat prompt");

        let client = match AnthropicClient::new(config.anthropic.clone()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let reply = match client
            .chat(&self.transcript(), self.temperature, self.max_tokens)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                log_error_with_context!(&e, "Chat request failed");
                eprintln!("❌ Chat request failed");
                eprintln!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("--- Reply ---");
        println!("{}", reply.content());
        println!("--- Metadata ---");
        for (key, value) in reply.metadata() {
            println!("{key}: {value}");
        }
        println!("--- Timestamp ---");
        println!("{}", reply.timestamp().to_rfc3339());
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatRole;

    #[test]
    fn test_transcript_with_system() {
        let args = ChatArgs {
            prompt: "hi".to_string(),
            system: Some("be brief".to_string()),
            temperature: 0.7,
            max_tokens: None,
        };
        let transcript = args.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role(), ChatRole::System);
        assert_eq!(transcript[1].role(), ChatRole::User);
        assert_eq!(transcript[1].content(), "hi");
    }

    #[test]
    fn test_transcript_without_system() {
        let args = ChatArgs {
            prompt: "hi".to_string(),
            system: None,
            temperature: 0.7,
            max_tokens: Some(64),
        };
        assert_eq!(args.transcript().len(), 1);
    }
}
