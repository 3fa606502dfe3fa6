//! Common `sprovider` imports for downstream crates.

pub use crate::{
    ApiClient, ClientConfig, CompletionOptions, ContentPart, HttpExecutor, HttpTransport,
    ImageDetail, Message, MessageContent, ProviderError, ProviderErrorKind, RequestConfig,
    RequestHooks, RequestKind, RequestOverrides, Role, ToolCall, ToolDefinition, ToolOutput,
};
pub use scommon::{BoxFuture, RunId, ThreadId};
