//! Assistant thread run state machine.
//!
//! A run moves through `Created → MessagesAppended → Running →
//! {RequiresAction ⇄ Running} → Completed | Failed | Cancelled | Expired |
//! TimedOut`. [`ThreadClient::run`] drives the whole sequence; the
//! individual steps are public for callers that need manual control.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use sprovider::{ClientConfig, HttpExecutor, ReqwestTransport};
//! use sthread::ThreadClient;
//!
//! let config = ClientConfig::builder()
//!     .assistant_api_key("sk-assistant")
//!     .build()
//!     .expect("config should build");
//! let executor = HttpExecutor::new(Arc::new(ReqwestTransport::default()));
//! let client = ThreadClient::new(Arc::new(config), Arc::new(executor));
//!
//! assert!(format!("{client:?}").contains("ThreadClient"));
//! ```

mod client;
mod error;
mod hooks;
mod types;

pub mod prelude {
    pub use crate::{
        AssistantRequest, AssistantRunOutcome, PollPolicy, Run, RunPhase, RunStatus, ThreadClient,
        ThreadError, ThreadErrorKind,
    };
}

pub use client::ThreadClient;
pub use error::{ThreadError, ThreadErrorKind};
pub use hooks::{NoopThreadRunHooks, ThreadRunHooks};
pub use types::{
    AssistantRequest, AssistantRunOutcome, DEFAULT_MAX_POLLS, DEFAULT_MESSAGE_LIMIT,
    DEFAULT_POLL_INTERVAL, PollOutcome, PollPolicy, Run, RunPhase, RunSpec, RunStatus,
};
pub use tokio_util::sync::CancellationToken;
