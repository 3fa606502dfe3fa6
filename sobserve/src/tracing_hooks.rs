//! Tracing-based observability hooks for HTTP attempts, tool dispatch, and
//! thread runs.
//!
//! ```rust
//! use sobserve::TracingObservabilityHooks;
//! use sthread::ThreadRunHooks;
//!
//! fn accepts_thread_hooks(_hooks: &dyn ThreadRunHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_thread_hooks(&hooks);
//! ```

use std::time::Duration;

use scommon::{RunId, ThreadId};
use sprovider::{ProviderError, RequestHooks, ToolCall, ToolOutput};
use sthread::{Run, RunPhase, ThreadError, ThreadRunHooks};
use stooling::{ToolDispatchHooks, ToolError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl RequestHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, url: &str, attempt: u32) {
        tracing::debug!(
            phase = "request",
            event = "attempt_start",
            operation,
            url,
            attempt
        );
    }

    fn on_attempt_failure(&self, operation: &str, url: &str, attempt: u32, error: &ProviderError) {
        tracing::warn!(
            phase = "request",
            event = "attempt_failure",
            operation,
            url,
            attempt,
            status = error.status,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_retry_scheduled(&self, operation: &str, attempt: u32, delay: Duration) {
        tracing::info!(
            phase = "request",
            event = "retry_scheduled",
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64
        );
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        tracing::debug!(phase = "request", event = "success", operation, attempts);
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &ProviderError) {
        tracing::error!(
            phase = "request",
            event = "exhausted",
            operation,
            attempts,
            status = error.status,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl ToolDispatchHooks for TracingObservabilityHooks {
    fn on_dispatch_start(&self, tool_call: &ToolCall) {
        tracing::info!(
            phase = "tool",
            event = "dispatch_start",
            tool_name = %tool_call.name,
            tool_call_id = %tool_call.id
        );
    }

    fn on_dispatch_success(&self, tool_call: &ToolCall, output: &ToolOutput, elapsed: Duration) {
        tracing::info!(
            phase = "tool",
            event = "dispatch_success",
            tool_name = %tool_call.name,
            tool_call_id = %tool_call.id,
            output_bytes = output.output.len(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_dispatch_failure(&self, tool_call: &ToolCall, error: &ToolError, elapsed: Duration) {
        tracing::error!(
            phase = "tool",
            event = "dispatch_failure",
            tool_name = %tool_call.name,
            tool_call_id = %tool_call.id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_dispatch_skipped(&self, tool_call: &ToolCall) {
        tracing::warn!(
            phase = "tool",
            event = "dispatch_skipped",
            tool_name = %tool_call.name,
            tool_call_id = %tool_call.id
        );
    }
}

impl ThreadRunHooks for TracingObservabilityHooks {
    fn on_phase_change(&self, thread_id: &ThreadId, run_id: Option<&RunId>, phase: RunPhase) {
        tracing::info!(
            phase = "thread",
            event = "phase_change",
            thread_id = %thread_id,
            run_id = run_id.map(RunId::as_str),
            run_phase = %phase
        );
    }

    fn on_poll(&self, run: &Run, poll: u32) {
        tracing::debug!(
            phase = "thread",
            event = "poll",
            thread_id = %run.thread_id,
            run_id = %run.id,
            status = %run.status,
            poll
        );
    }

    fn on_tool_outputs_submitted(&self, run: &Run, outputs: &[ToolOutput]) {
        tracing::info!(
            phase = "thread",
            event = "tool_outputs_submitted",
            thread_id = %run.thread_id,
            run_id = %run.id,
            outputs = outputs.len()
        );
    }

    fn on_run_error(&self, thread_id: Option<&ThreadId>, run_id: Option<&RunId>, error: &ThreadError) {
        tracing::error!(
            phase = "thread",
            event = "run_error",
            thread_id = thread_id.map(ThreadId::as_str),
            run_id = run_id.map(RunId::as_str),
            run_status = error.run_status.map(|status| status.as_str()),
            error_kind = ?error.kind,
            error = %error
        );
    }
}
