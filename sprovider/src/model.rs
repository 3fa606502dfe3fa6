//! Wire-level message, content and tool types shared by every call path.
//!
//! ```rust
//! use sprovider::{ContentPart, Message, MessageContent, Role};
//!
//! let message = Message::user("Summarize this diff");
//! assert_eq!(message.role, Role::User);
//! assert!(message.validate().is_ok());
//!
//! let normalized = message.content.clone().normalized();
//! assert_eq!(
//!     normalized,
//!     MessageContent::Parts(vec![ContentPart::text("Summarize this diff")])
//! );
//! assert_eq!(normalized.clone().normalized(), normalized);
//! ```

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        };

        f.write_str(role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    High,
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default)]
    pub detail: ImageDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>, detail: ImageDetail) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl {
                url: url.into(),
                detail,
            },
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Text { text } => text.trim().is_empty(),
            Self::ImageUrl { image_url } => image_url.url.trim().is_empty(),
        }
    }
}

/// Message body: either plain text or an ordered list of typed parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Wraps plain text into a single text part. Structured content is
    /// returned unchanged, so normalizing twice is a no-op.
    pub fn normalized(self) -> MessageContent {
        match self {
            Self::Text(text) => Self::Parts(vec![ContentPart::Text { text }]),
            parts @ Self::Parts(_) => parts,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Parts(parts) => parts.is_empty() || parts.iter().all(ContentPart::is_blank),
        }
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MessageContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(value: Vec<ContentPart>) -> Self {
        Self::Parts(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.content.is_empty() {
            return Err(ProviderError::validation(format!(
                "{} message content must not be empty",
                self.role
            )));
        }

        Ok(())
    }

    /// Body for the thread message sub-resource, content always as parts.
    pub fn to_thread_payload(&self) -> Value {
        json!({
            "role": self.role,
            "content": self.content.clone().normalized(),
        })
    }
}

/// Local function advertised to the remote model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    pub fn to_function_tool(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

impl ToolOutput {
    pub fn new(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            output: output.into(),
        }
    }

    /// Strings are submitted verbatim; any other value is JSON-encoded.
    pub fn from_value(tool_call_id: impl Into<String>, value: &Value) -> Self {
        let output = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };

        Self::new(tool_call_id, output)
    }
}
