//! Small convenience constructors for common types.

use crate::{
    AssistantRequest, ContentPart, ImageDetail, Message, MessageContent, ProviderError,
    RequestKind, Role,
};

pub fn system_message(content: impl Into<MessageContent>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<MessageContent>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<MessageContent>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn text_part(text: impl Into<String>) -> ContentPart {
    ContentPart::text(text)
}

pub fn image_part(url: impl Into<String>) -> ContentPart {
    ContentPart::image_url(url, ImageDetail::Auto)
}

pub fn assistant_request(assistant_id: impl Into<String>, messages: Vec<Message>) -> AssistantRequest {
    AssistantRequest::new(assistant_id, messages)
}

pub fn parse_request_kind(value: &str) -> Result<RequestKind, ProviderError> {
    value.parse()
}
