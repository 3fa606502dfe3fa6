//! Hook contracts for observing thread run progress.
//!
//! ```rust
//! use sthread::{NoopThreadRunHooks, ThreadRunHooks};
//!
//! fn accepts_hooks(_hooks: &dyn ThreadRunHooks) {}
//!
//! let hooks = NoopThreadRunHooks;
//! accepts_hooks(&hooks);
//! ```

use scommon::{RunId, ThreadId};
use sprovider::ToolOutput;

use crate::{Run, RunPhase, ThreadError};

pub trait ThreadRunHooks: Send + Sync {
    fn on_phase_change(&self, _thread_id: &ThreadId, _run_id: Option<&RunId>, _phase: RunPhase) {}

    /// Called with every polled snapshot; `poll` is 1-based.
    fn on_poll(&self, _run: &Run, _poll: u32) {}

    fn on_tool_outputs_submitted(&self, _run: &Run, _outputs: &[ToolOutput]) {}

    /// `thread_id` is `None` when the failure happened before a thread existed.
    fn on_run_error(
        &self,
        _thread_id: Option<&ThreadId>,
        _run_id: Option<&RunId>,
        _error: &ThreadError,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopThreadRunHooks;

impl ThreadRunHooks for NoopThreadRunHooks {}
