//! Observability hooks for HTTP attempts, tool dispatch, and thread runs.
//!
//! ```rust
//! use sobserve::{CombinedHooks, MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks};
//!
//! let _hooks = SafeHooks::new(CombinedHooks::new(
//!     TracingObservabilityHooks,
//!     MetricsObservabilityHooks,
//! ));
//! ```

mod combined;
mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use combined::CombinedHooks;
pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::SafeHooks;
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        CombinedHooks, MetricsObservabilityHooks, SafeHooks, TracingObservabilityHooks,
    };
}
