//! Common imports for most spindle applications.

pub use crate::{
    assistant_message, assistant_request, image_part, parse_request_kind, system_message,
    text_part, user_message,
};
pub use crate::{sp_messages, sp_msg};
pub use crate::{
    AssistantRequest, AssistantRunOutcome, CancellationToken, ClientConfig, CompletionOptions,
    ContentPart, EmbeddingOptions, ImageOptions, Message, ModerationOptions, PollPolicy,
    ProviderError, ProviderErrorKind, RequestKind, RequestOverrides, Role, RunPhase, RunStatus,
    Spindle, SpindleBuilder, ThreadError, ThreadErrorKind, ToolDefinition, ToolError,
    ToolRegistry, UnmatchedToolPolicy,
};
