//! Unified facade over the spindle workspace crates.
//!
//! This crate is meant to be the single dependency for most applications. It
//! re-exports the transport, tooling, thread and observability crates and
//! wires them into one [`Spindle`] client.
//!
//! ```rust,no_run
//! use spindle::prelude::*;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Spindle::builder(ClientConfig::from_env()?)
//!     .with_observability()
//!     .build();
//!
//! let messages = client
//!     .assistant(AssistantRequest::new(
//!         "asst_123",
//!         sp_messages![user => "What's on my calendar today?"],
//!     ))
//!     .await?;
//! println!("{} messages", messages.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod macros;

pub mod prelude;
pub mod util;

pub use scommon;
pub use sobserve;
pub use sprovider;
pub use sthread;
pub use stooling;

pub use client::{ObservabilityHooks, Spindle, SpindleBuilder};
pub use scommon::{BoxFuture, Registry, RunId, SamplingOptions, ThreadId};
pub use sobserve::{
    CombinedHooks, MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks,
};
pub use sprovider::{
    ApiClient, ClientConfig, ClientConfigBuilder, CompletionOptions, ContentPart,
    CredentialStore, EmbeddingOptions, EndpointResolver, HttpExecutor, HttpMethod, HttpRequest,
    HttpResponse, HttpTransport, ImageDetail, ImageOptions, ImageUrl, KeyScope, Message,
    MessageContent, ModerationOptions, NoopRequestHooks, ProviderError, ProviderErrorKind,
    ProviderFuture, RequestConfig, RequestHooks, RequestKind, RequestOverrides, ReqwestTransport,
    RetryPolicy, Role, SecretString, ToolCall, ToolDefinition, ToolOutput,
};
pub use sthread::{
    AssistantRequest, AssistantRunOutcome, CancellationToken, NoopThreadRunHooks, PollOutcome,
    PollPolicy, Run, RunPhase, RunSpec, RunStatus, ThreadClient, ThreadError, ThreadErrorKind,
    ThreadRunHooks,
};
pub use stooling::{
    FunctionTool, NoopToolDispatchHooks, ToolDispatchHooks, ToolDispatcher, ToolError,
    ToolErrorKind, ToolFuture, ToolHandler, ToolRegistry, UnmatchedToolPolicy, decode_arguments,
    parse_json_object, required_string,
};

pub use util::{
    assistant_message, assistant_request, image_part, parse_request_kind, system_message,
    text_part, user_message,
};

#[cfg(test)]
mod tests {
    use crate::{MessageContent, Role};

    #[test]
    fn sp_msg_macro_creates_expected_message() {
        let message = crate::sp_msg!(user => "hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, MessageContent::from("hello"));
    }

    #[test]
    fn sp_messages_macro_builds_message_vector() {
        let messages = crate::sp_messages![
            system => "You are concise.",
            user => "Summarize the thread",
        ];

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(crate::sp_messages![].is_empty());
    }
}
