//! Handler contract for locally executed tools.
//!
//! ```rust
//! use serde_json::json;
//! use sprovider::ToolDefinition;
//! use stooling::{FunctionTool, ToolHandler};
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition::new("echo", "Echoes input", json!({"type": "object"})),
//!     |args| async move { Ok(args) },
//! );
//!
//! assert_eq!(tool.definition().name, "echo");
//! ```

use std::future::Future;
use std::sync::Arc;

use scommon::BoxFuture;
use serde_json::Value;
use sprovider::ToolDefinition;

use crate::ToolError;

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// A local function the remote model may call. Receives decoded JSON
/// arguments and returns any JSON value; strings are submitted verbatim.
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn invoke<'a>(&'a self, arguments: &'a Value) -> ToolFuture<'a, Result<Value, ToolError>>;
}

type HandlerFn = dyn Fn(Value) -> ToolFuture<'static, Result<Value, ToolError>> + Send + Sync;

pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<HandlerFn>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        let handler: Arc<HandlerFn> = Arc::new(move |arguments| Box::pin(handler(arguments)));

        Self {
            definition,
            handler,
        }
    }
}

impl ToolHandler for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(&'a self, arguments: &'a Value) -> ToolFuture<'a, Result<Value, ToolError>> {
        (self.handler)(arguments.clone())
    }
}
