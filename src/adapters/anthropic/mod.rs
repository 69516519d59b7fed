//! Anthropic Claude adapter
//!
//! Implements [`crate::core::ports::LlmClient`] over the Messages API.

pub mod client;
pub mod models;

pub use client::{AnthropicClient, MESSAGES_PATH};
