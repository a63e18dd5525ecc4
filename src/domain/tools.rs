//! Built-in tools exposed via Model Context Protocol
//!
//! Provides `echo`, `time` and `calculate`. Argument structs carry the declared
//! input schema; the handlers read the raw argument map so that a missing field
//! is reported with a readable message instead of a serde error.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rust_mcp_sdk::{
    macros,
    schema::{CallToolResult, Tool},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::calculator::evaluate;
use crate::domain::registry::{
    required_str, text_result, DuplicateTool, ToolError, ToolHandler, ToolRegistry,
};

#[macros::mcp_tool(name = "echo", description = "Echo back the input text")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct EchoTool {
    /// Text to echo back
    pub text: String,
}

#[macros::mcp_tool(name = "time", description = "Get current server time")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct TimeTool {}

#[macros::mcp_tool(
    name = "calculate",
    description = "Perform basic mathematical calculations"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct CalculateTool {
    /// Mathematical expression to evaluate (e.g., '2 + 3 * 4')
    pub expression: String,
}

pub struct Echo;

pub struct CurrentTime;

pub struct Calculate;

#[async_trait]
impl ToolHandler for Echo {
    fn definition(&self) -> Tool {
        EchoTool::tool()
    }

    async fn call(&self, arguments: Map<String, Value>) -> Result<CallToolResult, ToolError> {
        let text = required_str(&arguments, "text")?;
        Ok(text_result(format!("Echo: {text}")))
    }
}

#[async_trait]
impl ToolHandler for CurrentTime {
    fn definition(&self) -> Tool {
        TimeTool::tool()
    }

    async fn call(&self, _arguments: Map<String, Value>) -> Result<CallToolResult, ToolError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(text_result(format!("Current server time: {now}")))
    }
}

#[async_trait]
impl ToolHandler for Calculate {
    fn definition(&self) -> Tool {
        CalculateTool::tool()
    }

    async fn call(&self, arguments: Map<String, Value>) -> Result<CallToolResult, ToolError> {
        let expression = required_str(&arguments, "expression")?;
        let value = evaluate(expression)
            .map_err(|err| ToolError::Execution(format!("Calculation error: {err}")))?;
        Ok(text_result(format!("{expression} = {value}")))
    }
}

/// The catalog served by the binary, in the order `tools/list` reports it.
pub fn default_registry() -> Result<ToolRegistry, DuplicateTool> {
    let mut registry = ToolRegistry::new();
    registry.register(Echo)?;
    registry.register(CurrentTime)?;
    registry.register(Calculate)?;
    Ok(registry)
}
