//! Panic isolation for hook implementations. A panicking hook is swallowed so
//! it cannot abort a request or a run.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use scommon::{RunId, ThreadId};
use sprovider::{ProviderError, RequestHooks, ToolCall, ToolOutput};
use sthread::{Run, RunPhase, ThreadError, ThreadRunHooks};
use stooling::{ToolDispatchHooks, ToolError};

#[derive(Debug, Clone, Copy, Default)]
pub struct SafeHooks<H> {
    inner: H,
}

impl<H> SafeHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H> RequestHooks for SafeHooks<H>
where
    H: RequestHooks,
{
    fn on_attempt_start(&self, operation: &str, url: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(operation, url, attempt)
        }));
    }

    fn on_attempt_failure(&self, operation: &str, url: &str, attempt: u32, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_failure(operation, url, attempt, error)
        }));
    }

    fn on_retry_scheduled(&self, operation: &str, attempt: u32, delay: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_retry_scheduled(operation, attempt, delay)
        }));
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(operation, attempts)
        }));
    }

    fn on_exhausted(&self, operation: &str, attempts: u32, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_exhausted(operation, attempts, error)
        }));
    }
}

impl<H> ToolDispatchHooks for SafeHooks<H>
where
    H: ToolDispatchHooks,
{
    fn on_dispatch_start(&self, tool_call: &ToolCall) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_dispatch_start(tool_call)));
    }

    fn on_dispatch_success(&self, tool_call: &ToolCall, output: &ToolOutput, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch_success(tool_call, output, elapsed)
        }));
    }

    fn on_dispatch_failure(&self, tool_call: &ToolCall, error: &ToolError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_dispatch_failure(tool_call, error, elapsed)
        }));
    }

    fn on_dispatch_skipped(&self, tool_call: &ToolCall) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_dispatch_skipped(tool_call)));
    }
}

impl<H> ThreadRunHooks for SafeHooks<H>
where
    H: ThreadRunHooks,
{
    fn on_phase_change(&self, thread_id: &ThreadId, run_id: Option<&RunId>, phase: RunPhase) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_phase_change(thread_id, run_id, phase)
        }));
    }

    fn on_poll(&self, run: &Run, poll: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_poll(run, poll)));
    }

    fn on_tool_outputs_submitted(&self, run: &Run, outputs: &[ToolOutput]) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_tool_outputs_submitted(run, outputs)
        }));
    }

    fn on_run_error(&self, thread_id: Option<&ThreadId>, run_id: Option<&RunId>, error: &ThreadError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_run_error(thread_id, run_id, error)
        }));
    }
}
