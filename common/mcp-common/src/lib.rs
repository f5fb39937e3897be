//! MCP Common - Shared utilities for MCP servers
//!
//! - **Initialization**: [`init_tracing`] to stderr, text or JSON
//! - **Replies**: single text-block `CallToolResult` helpers, success or error
//! - **Operations**: [`operations!`] for tools routed by an `operation` argument
//! - **Embeddable**: [`EmbeddableMcp`] trait for in-process execution
//!
//! # Example
//!
//! ```rust,ignore
//! mcp_common::operations! {
//!     pub enum WorkspaceOperation {
//!         Hello => "hello",
//!         ListWorkspaces => "list_workspaces",
//!     }
//! }
//!
//! fn reply(outcome: Result<String, String>) -> CallToolResult {
//!     mcp_common::text_reply(outcome)
//! }
//! ```

pub mod embeddable;
pub mod init;
pub mod operation;
pub mod result;

// Re-export commonly used items at crate root
pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use init::init_tracing;
pub use operation::{operation_schema, Operation};
pub use result::{text_error, text_reply, text_success};

// Re-export rmcp types that are commonly needed
pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

// Re-export async_trait for implementing EmbeddableMcp
pub use async_trait::async_trait;
