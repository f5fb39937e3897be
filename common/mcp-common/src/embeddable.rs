//! In-process tool calls
//!
//! [`EmbeddableMcp`] lets a host (or a test) call a server's tools directly,
//! skipping the stdio transport. Arguments go in as a JSON object exactly as
//! an MCP client would send them.
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//!
//! let tools = server.list_tools();
//! let result = server
//!     .call_tool("jira_projects", serde_json::json!({ "operation": "list" }))
//!     .await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

/// Error type for embeddable MCP operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// No tool with this name is registered
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments did not deserialize into the tool's parameter type
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] serde_json::Error),
}

/// Result type for embeddable MCP operations
pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// Trait for MCP servers that can be executed in-process
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Server name, as advertised during MCP initialization
    fn server_name(&self) -> &str;

    /// All tools with their input schemas
    fn list_tools(&self) -> Vec<Tool>;

    /// Execute a tool by name with a JSON object of arguments
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoServer;

    #[async_trait]
    impl EmbeddableMcp for EchoServer {
        fn server_name(&self) -> &str {
            "echo"
        }

        fn list_tools(&self) -> Vec<Tool> {
            vec![]
        }

        async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
            if name != "echo" {
                return Err(EmbeddableError::ToolNotFound(name.to_string()));
            }
            let text: String = serde_json::from_value(params)?;
            Ok(crate::text_success(text))
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result = EchoServer.call_tool("nope", serde_json::json!({})).await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_bad_params() {
        let result = EchoServer.call_tool("echo", serde_json::json!({})).await;
        assert!(matches!(result, Err(EmbeddableError::InvalidParams(_))));
    }

    #[tokio::test]
    async fn test_echo() {
        let result = EchoServer
            .call_tool("echo", serde_json::json!("hi"))
            .await
            .unwrap();
        assert_eq!(result.content.len(), 1);
        assert_eq!(EchoServer.server_name(), "echo");
    }
}
