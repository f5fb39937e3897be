//! Jira MCP Library
//!
//! Jira Cloud and Server/Data Center operations exposed as MCP tools:
//! workspaces (named credential profiles), projects and issues.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use jira_mcp::{JiraMcpServer, ServerConfig, WorkspaceStore};
//! use mcp_common::EmbeddableMcp;
//!
//! let config = ServerConfig::load(None)?;
//! let store = WorkspaceStore::load(config.home.clone())?;
//! let server = JiraMcpServer::new(store, config);
//!
//! let result = server
//!     .call_tool("jira_workspace", serde_json::json!({ "operation": "list_workspaces" }))
//!     .await?;
//! ```

pub mod config;
pub mod handlers;
pub mod jira;
pub mod params;
pub mod server;
pub mod workspace;

pub use config::ServerConfig;
pub use server::JiraMcpServer;
pub use workspace::{AuthType, WorkspaceStore};

// Re-export parameter types for direct API usage
pub use params::{
    IssueOperation, IssueParams, ProjectOperation, ProjectParams, WorkspaceOperation,
    WorkspaceParams,
};
