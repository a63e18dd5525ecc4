//! Tool registry handed to the dispatcher at construction
//!
//! The registry is built once at startup and never mutated while requests are
//! being served, so it is shared behind an `Arc` without any locking.

use std::sync::Arc;

use async_trait::async_trait;
use rust_mcp_sdk::schema::{CallToolResult, ContentBlock, TextContent, Tool};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Failure reported by a tool. Always surfaced to the client as `Invalid params`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Execution(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tool '{0}' is already registered")]
pub struct DuplicateTool(pub String);

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> Tool;

    async fn call(&self, arguments: Map<String, Value>) -> Result<CallToolResult, ToolError>;
}

#[derive(Clone)]
struct RegisteredTool {
    definition: Tool,
    handler: Arc<dyn ToolHandler>,
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: ToolHandler + 'static>(&mut self, handler: T) -> Result<(), DuplicateTool> {
        let definition = handler.definition();
        if self.get(&definition.name).is_some() {
            return Err(DuplicateTool(definition.name));
        }

        debug!(tool = %definition.name, "registering tool");
        self.tools.push(RegisteredTool {
            definition,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools
            .iter()
            .find(|tool| tool.definition.name == name)
            .map(|tool| Arc::clone(&tool.handler))
    }

    /// Tool definitions in registration order.
    pub fn list(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|tool| tool.definition.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text.into(), None, None))],
        is_error: None,
        meta: None,
        structured_content: None,
    }
}

/// Reads a required, non-empty string argument.
pub fn required_str<'a>(arguments: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing required parameter: {key}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::tools::{Calculate, CurrentTime, Echo};

    #[test]
    fn lists_tools_in_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Calculate).expect("register calculate");
        registry.register(Echo).expect("register echo");
        registry.register(CurrentTime).expect("register time");

        let names: Vec<String> = registry.list().into_iter().map(|tool| tool.name).collect();
        assert_eq!(names, vec!["calculate", "echo", "time"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo).expect("register echo");

        let err = registry.register(Echo).expect_err("duplicate must fail");
        assert_eq!(err, DuplicateTool("echo".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_tool_is_absent() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("echo").is_none());
    }

    #[test]
    fn required_str_rejects_missing_and_empty_values() {
        let arguments = json!({"text": "", "count": 3});
        let arguments = arguments.as_object().expect("object");

        for key in ["text", "count", "absent"] {
            let err = required_str(arguments, key).expect_err("must fail");
            assert_eq!(
                err,
                ToolError::InvalidArguments(format!("Missing required parameter: {key}"))
            );
        }
    }

    #[test]
    fn text_result_serializes_as_text_content() {
        let value = serde_json::to_value(text_result("hello")).expect("serialize result");
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "hello");
    }
}
