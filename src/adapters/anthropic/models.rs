//! Anthropic Messages API wire models
//!
//! Request construction enforces the transcript shape the API accepts: at
//! most one system prompt, placed first, followed by at least one turn.

use crate::domain::{ChatMessage, ChatRole, LlmError, OptimedError, Result};
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/messages`
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub messages: Vec<WireMessage<'a>>,
    pub temperature: f32,
}

/// One conversation turn on the wire
#[derive(Debug, Serialize)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Successful response of `POST /v1/messages`
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// Error envelope returned with non-success statuses
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: String,
}

fn wire_role(role: ChatRole) -> Option<&'static str> {
    match role {
        ChatRole::User => Some("user"),
        ChatRole::Assistant => Some("assistant"),
        ChatRole::System => None,
    }
}

fn invalid_request(message: impl Into<String>) -> OptimedError {
    OptimedError::Llm(LlmError::InvalidRequest(message.into()))
}

impl<'a> MessagesRequest<'a> {
    /// Builds a request from a domain transcript
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidRequest`] when a system message appears
    /// anywhere but first, when there are no user or assistant turns, or when
    /// `temperature` is outside `0.0..=1.0`.
    pub fn from_transcript(
        model: &'a str,
        messages: &'a [ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(invalid_request(format!(
                "temperature {temperature} must be between 0 and 1"
            )));
        }

        let (system, turns) = match messages.split_first() {
            Some((first, rest)) if first.role() == ChatRole::System => {
                (Some(first.content()), rest)
            }
            _ => (None, messages),
        };

        let wire = turns
            .iter()
            .enumerate()
            .map(|(i, msg)| {
                wire_role(msg.role())
                    .map(|role| WireMessage {
                        role,
                        content: msg.content(),
                    })
                    .ok_or_else(|| {
                        invalid_request(format!(
                            "system message at position {} must be the first message",
                            i + usize::from(system.is_some())
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        if wire.is_empty() {
            return Err(invalid_request("transcript has no user or assistant turns"));
        }

        Ok(Self {
            model,
            max_tokens,
            system,
            messages: wire,
            temperature,
        })
    }
}

impl MessagesResponse {
    /// Concatenated text of every text block
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect()
    }

    /// Converts the response into an assistant message with usage metadata
    pub fn into_chat_message(self, requested_model: &str) -> Result<ChatMessage> {
        let mut reply = ChatMessage::assistant(self.text())
            .with_metadata("model", self.model.as_deref().unwrap_or(requested_model))?
            .with_metadata("response_id", self.id.as_str())?
            .with_metadata("input_tokens", self.usage.input_tokens.to_string())?
            .with_metadata("output_tokens", self.usage.output_tokens.to_string())?;

        if let Some(stop_reason) = self.stop_reason {
            reply = reply.with_metadata("stop_reason", stop_reason)?;
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leading_system_becomes_system_field() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let req = MessagesRequest::from_transcript("m", &messages, 0.7, 4096).unwrap();

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["system"], "be brief");
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hi"}]));
        assert_eq!(body["max_tokens"], 4096);
    }

    #[test]
    fn test_no_system_field_when_absent() {
        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("how are you"),
        ];
        let req = MessagesRequest::from_transcript("m", &messages, 0.0, 10).unwrap();
        let body = serde_json::to_value(&req).unwrap();

        assert!(body.get("system").is_none());
        assert_eq!(body["messages"][1]["role"], "assistant");
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_late_system_rejected() {
        let messages = vec![
            ChatMessage::system("a"),
            ChatMessage::user("hi"),
            ChatMessage::system("b"),
        ];
        let err = MessagesRequest::from_transcript("m", &messages, 0.5, 10).unwrap_err();
        assert!(matches!(err, OptimedError::Llm(LlmError::InvalidRequest(_))));
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn test_empty_turns_rejected() {
        let only_system = vec![ChatMessage::system("a")];
        assert!(MessagesRequest::from_transcript("m", &only_system, 0.5, 10).is_err());
        assert!(MessagesRequest::from_transcript("m", &[], 0.5, 10).is_err());
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let messages = vec![ChatMessage::user("hi")];
        assert!(MessagesRequest::from_transcript("m", &messages, 1.5, 10).is_err());
        assert!(MessagesRequest::from_transcript("m", &messages, -0.1, 10).is_err());
    }

    #[test]
    fn test_response_text_and_metadata() {
        let resp: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-sonnet-20241022",
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "tool_use", "id": "t", "name": "x", "input": {}},
                {"type": "text", "text": "world"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 5, "output_tokens": 7}
        }))
        .unwrap();

        let reply = resp.into_chat_message("fallback").unwrap();
        assert_eq!(reply.role(), ChatRole::Assistant);
        assert_eq!(reply.content(), "Hello world");
        assert_eq!(reply.metadata_value("model"), Some("claude-3-5-sonnet-20241022"));
        assert_eq!(reply.metadata_value("response_id"), Some("msg_1"));
        assert_eq!(reply.metadata_value("input_tokens"), Some("5"));
        assert_eq!(reply.metadata_value("output_tokens"), Some("7"));
        assert_eq!(reply.metadata_value("stop_reason"), Some("end_turn"));
    }

    #[test]
    fn test_error_envelope() {
        let env: ErrorEnvelope = serde_json::from_value(json!({
            "type": "error",
            "error": {"type": "overloaded_error", "message": "Overloaded"}
        }))
        .unwrap();
        assert_eq!(env.error.kind.as_deref(), Some("overloaded_error"));
        assert_eq!(env.error.message, "Overloaded");
    }
}
