//! # Schemas Module
//!
//! Wire types for the OpenAI-compatible chat-completion endpoint. Only the
//! fields the smoke tester sends are modelled on the request side; responses
//! are kept as raw JSON so that non-conforming servers can still be reported.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// # Chat Completion Request
///
/// Body POSTed to `/v1/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation, oldest first. Never empty once validated.
    pub messages: Vec<Message>,
    /// Whether the server should stream Server-Sent Events
    pub stream: bool,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>, stream: bool) -> Self {
        Self {
            model: model.into(),
            messages,
            stream,
        }
    }

    /// Check the request invariants before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        if self.messages.is_empty() {
            return Err("messages must contain at least one message".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        Ok(())
    }
}

/// # Chat Response
///
/// Status code and decoded body of one chat-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub status: u16,
    pub body: Value,
}

impl ChatResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Content of the first choice's message, if the body carries one.
    pub fn message_content(&self) -> Option<String> {
        crate::probe::extract_message_content(self)
    }
}
