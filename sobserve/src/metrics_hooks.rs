//! Metrics-based observability hooks for HTTP attempts, tool dispatch, and
//! thread runs. All series carry the `spindle_` prefix.
//!
//! ```rust
//! use sobserve::MetricsObservabilityHooks;
//! use sprovider::RequestHooks;
//!
//! fn accepts_request_hooks(_hooks: &dyn RequestHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_request_hooks(&hooks);
//! ```

use std::time::Duration;

use scommon::{RunId, ThreadId};
use sprovider::{ProviderError, RequestHooks, ToolCall, ToolOutput};
use sthread::{Run, RunPhase, ThreadError, ThreadRunHooks};
use stooling::{ToolDispatchHooks, ToolError};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl RequestHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, _url: &str, _attempt: u32) {
        metrics::counter!(
            "spindle_request_attempt_start_total",
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_attempt_failure(&self, operation: &str, _url: &str, _attempt: u32, error: &ProviderError) {
        metrics::counter!(
            "spindle_request_attempt_failure_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind),
            "status" => error.status.map(|status| status.to_string()).unwrap_or_else(|| "none".to_string())
        )
        .increment(1);
    }

    fn on_retry_scheduled(&self, operation: &str, _attempt: u32, delay: Duration) {
        metrics::histogram!(
            "spindle_request_retry_delay_seconds",
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        metrics::counter!(
            "spindle_request_success_total",
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "spindle_request_attempts_per_success",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &ProviderError) {
        metrics::counter!(
            "spindle_request_exhausted_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "spindle_request_attempts_per_failure",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }
}

impl ToolDispatchHooks for MetricsObservabilityHooks {
    fn on_dispatch_start(&self, tool_call: &ToolCall) {
        metrics::counter!(
            "spindle_tool_dispatch_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_dispatch_success(&self, tool_call: &ToolCall, _output: &ToolOutput, elapsed: Duration) {
        metrics::counter!(
            "spindle_tool_dispatch_success_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "spindle_tool_dispatch_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_dispatch_failure(&self, tool_call: &ToolCall, error: &ToolError, elapsed: Duration) {
        metrics::counter!(
            "spindle_tool_dispatch_failure_total",
            "tool_name" => tool_call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "spindle_tool_dispatch_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_dispatch_skipped(&self, tool_call: &ToolCall) {
        metrics::counter!(
            "spindle_tool_dispatch_skipped_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }
}

impl ThreadRunHooks for MetricsObservabilityHooks {
    fn on_phase_change(&self, _thread_id: &ThreadId, _run_id: Option<&RunId>, phase: RunPhase) {
        metrics::counter!("spindle_thread_phase_total", "phase" => phase.as_str()).increment(1);
    }

    fn on_poll(&self, run: &Run, _poll: u32) {
        metrics::counter!("spindle_thread_poll_total", "status" => run.status.as_str()).increment(1);
    }

    fn on_tool_outputs_submitted(&self, _run: &Run, outputs: &[ToolOutput]) {
        metrics::counter!("spindle_thread_tool_submission_total").increment(1);
        metrics::histogram!("spindle_thread_tool_outputs_per_submission").record(outputs.len() as f64);
    }

    fn on_run_error(&self, _thread_id: Option<&ThreadId>, _run_id: Option<&RunId>, error: &ThreadError) {
        metrics::counter!(
            "spindle_thread_run_error_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }
}
