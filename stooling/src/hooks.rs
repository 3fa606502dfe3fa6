//! Lifecycle hooks for tool dispatch.
//!
//! ```rust
//! use stooling::{NoopToolDispatchHooks, ToolDispatchHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolDispatchHooks) {}
//!
//! let hooks = NoopToolDispatchHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use sprovider::{ToolCall, ToolOutput};

use crate::ToolError;

pub trait ToolDispatchHooks: Send + Sync {
    fn on_dispatch_start(&self, _tool_call: &ToolCall) {}

    fn on_dispatch_success(&self, _tool_call: &ToolCall, _output: &ToolOutput, _elapsed: Duration) {
    }

    fn on_dispatch_failure(&self, _tool_call: &ToolCall, _error: &ToolError, _elapsed: Duration) {}

    fn on_dispatch_skipped(&self, _tool_call: &ToolCall) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolDispatchHooks;

impl ToolDispatchHooks for NoopToolDispatchHooks {}
