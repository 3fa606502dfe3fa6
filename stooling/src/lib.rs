//! Tool dispatch table: maps tool names to local handlers and turns remote
//! tool calls into submittable outputs.

mod args;
mod dispatch;
mod error;
mod hooks;
mod registry;
mod tool;

pub mod prelude {
    pub use crate::{
        FunctionTool, ToolDispatcher, ToolError, ToolErrorKind, ToolFuture, ToolHandler,
        ToolRegistry, UnmatchedToolPolicy,
    };
}

pub use args::{decode_arguments, parse_json_object, required_string};
pub use dispatch::{ToolDispatcher, UnmatchedToolPolicy};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolDispatchHooks, ToolDispatchHooks};
pub use registry::ToolRegistry;
pub use tool::{FunctionTool, ToolFuture, ToolHandler};
