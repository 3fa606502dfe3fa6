//! Fan-out of every hook call to two implementations, in order.

use std::time::Duration;

use scommon::{RunId, ThreadId};
use sprovider::{ProviderError, RequestHooks, ToolCall, ToolOutput};
use sthread::{Run, RunPhase, ThreadError, ThreadRunHooks};
use stooling::{ToolDispatchHooks, ToolError};

#[derive(Debug, Clone, Copy, Default)]
pub struct CombinedHooks<A, B> {
    first: A,
    second: B,
}

impl<A, B> CombinedHooks<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> RequestHooks for CombinedHooks<A, B>
where
    A: RequestHooks,
    B: RequestHooks,
{
    fn on_attempt_start(&self, operation: &str, url: &str, attempt: u32) {
        self.first.on_attempt_start(operation, url, attempt);
        self.second.on_attempt_start(operation, url, attempt);
    }

    fn on_attempt_failure(&self, operation: &str, url: &str, attempt: u32, error: &ProviderError) {
        self.first.on_attempt_failure(operation, url, attempt, error);
        self.second.on_attempt_failure(operation, url, attempt, error);
    }

    fn on_retry_scheduled(&self, operation: &str, attempt: u32, delay: Duration) {
        self.first.on_retry_scheduled(operation, attempt, delay);
        self.second.on_retry_scheduled(operation, attempt, delay);
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        self.first.on_success(operation, attempts);
        self.second.on_success(operation, attempts);
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &ProviderError) {
        self.first.on_exhausted(operation, attempts, error);
        self.second.on_exhausted(operation, attempts, error);
    }
}

impl<A, B> ToolDispatchHooks for CombinedHooks<A, B>
where
    A: ToolDispatchHooks,
    B: ToolDispatchHooks,
{
    fn on_dispatch_start(&self, tool_call: &ToolCall) {
        self.first.on_dispatch_start(tool_call);
        self.second.on_dispatch_start(tool_call);
    }

    fn on_dispatch_success(&self, tool_call: &ToolCall, output: &ToolOutput, elapsed: Duration) {
        self.first.on_dispatch_success(tool_call, output, elapsed);
        self.second.on_dispatch_success(tool_call, output, elapsed);
    }

    fn on_dispatch_failure(&self, tool_call: &ToolCall, error: &ToolError, elapsed: Duration) {
        self.first.on_dispatch_failure(tool_call, error, elapsed);
        self.second.on_dispatch_failure(tool_call, error, elapsed);
    }

    fn on_dispatch_skipped(&self, tool_call: &ToolCall) {
        self.first.on_dispatch_skipped(tool_call);
        self.second.on_dispatch_skipped(tool_call);
    }
}

impl<A, B> ThreadRunHooks for CombinedHooks<A, B>
where
    A: ThreadRunHooks,
    B: ThreadRunHooks,
{
    fn on_phase_change(&self, thread_id: &ThreadId, run_id: Option<&RunId>, phase: RunPhase) {
        self.first.on_phase_change(thread_id, run_id, phase);
        self.second.on_phase_change(thread_id, run_id, phase);
    }

    fn on_poll(&self, run: &Run, poll: u32) {
        self.first.on_poll(run, poll);
        self.second.on_poll(run, poll);
    }

    fn on_tool_outputs_submitted(&self, run: &Run, outputs: &[ToolOutput]) {
        self.first.on_tool_outputs_submitted(run, outputs);
        self.second.on_tool_outputs_submitted(run, outputs);
    }

    fn on_run_error(&self, thread_id: Option<&ThreadId>, run_id: Option<&RunId>, error: &ThreadError) {
        self.first.on_run_error(thread_id, run_id, error);
        self.second.on_run_error(thread_id, run_id, error);
    }
}
