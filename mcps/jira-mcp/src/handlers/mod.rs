//! Tool dispatch for the Jira MCP tools
//!
//! Organized by tool: workspace, projects, issues. Each dispatcher resolves
//! the `operation`, checks required parameters, calls the adapter and renders
//! the outcome. Failures become error-flagged text replies; nothing here
//! returns `Err` to the MCP runtime.

mod format;
mod issues;
mod projects;
mod workspace;

pub use issues::dispatch_issues;
pub use projects::dispatch_projects;
pub use workspace::dispatch_workspace;

use std::sync::Arc;

use mcp_common::{text_reply, CallToolResult, Operation};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::config::ServerConfig;
use crate::jira::{ClientError, IssueError, IssueOperations, JiraClient};
use crate::workspace::{Credentials, WorkspaceError, WorkspaceStore};

/// State shared by every tool call
pub struct AppState {
    store: Mutex<WorkspaceStore>,
    config: ServerConfig,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(store: WorkspaceStore, config: ServerConfig) -> Self {
        Self {
            store: Mutex::new(store),
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub async fn store(&self) -> MutexGuard<'_, WorkspaceStore> {
        self.store.lock().await
    }

    /// Resolve credentials for the named workspace, or the active one
    pub async fn credentials(&self, workspace: Option<&str>) -> Result<Credentials, ToolFailure> {
        Ok(self.store().await.get_credentials(workspace)?)
    }

    /// Open a client for the named workspace, or the active one
    pub async fn client(&self, workspace: Option<&str>) -> Result<JiraClient, ToolFailure> {
        let credentials = self.credentials(workspace).await?;
        Ok(JiraClient::new(&credentials, self.config.request_timeout)?)
    }

    pub async fn issue_operations(
        &self,
        workspace: Option<&str>,
    ) -> Result<IssueOperations, ToolFailure> {
        let client = self.client(workspace).await?;
        Ok(IssueOperations::new(
            client,
            self.config.subtask_issue_type.clone(),
        ))
    }
}

/// Why a tool call could not produce its normal reply
#[derive(Error, Debug)]
pub enum ToolFailure {
    #[error("❌ **Parameter Error**: Missing required parameter 'operation'\n\nAvailable operations: {available}")]
    MissingOperation { available: String },

    #[error("❌ **Invalid Operation**: '{requested}'\n\nAvailable operations: {available}")]
    InvalidOperation { requested: String, available: String },

    #[error(
        "❌ **Missing Required Parameters**\n\nRequired: {}\nMissing: {}\n\nExample:\n```\n{usage}\n```",
        .required.join(", "),
        .missing.join(", ")
    )]
    MissingParams {
        required: Vec<&'static str>,
        missing: Vec<&'static str>,
        usage: String,
    },

    #[error("❌ **Invalid Parameter**: {0}")]
    InvalidParam(String),

    #[error("❌ **Workspace Error**: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("❌ **Jira Error**: {0}")]
    Client(#[from] ClientError),

    #[error("❌ **Issue Error**: {0}")]
    Issue(#[from] IssueError),
}

pub type ToolOutcome = Result<String, ToolFailure>;

/// Resolve the `operation` argument against a closed operation set
pub(crate) fn resolve_operation<O: Operation>(operation: Option<&str>) -> Result<O, ToolFailure> {
    let requested = operation.map(str::trim).filter(|op| !op.is_empty());
    match requested {
        None => Err(ToolFailure::MissingOperation {
            available: O::listing(),
        }),
        Some(name) => O::parse(name).ok_or_else(|| ToolFailure::InvalidOperation {
            requested: name.to_string(),
            available: O::listing(),
        }),
    }
}

/// Collects required parameters for one operation
///
/// Blank strings count as missing.
pub(crate) struct Required {
    required: Vec<&'static str>,
    missing: Vec<&'static str>,
}

impl Required {
    pub(crate) fn new() -> Self {
        Self {
            required: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub(crate) fn field<'a>(&mut self, name: &'static str, value: Option<&'a str>) -> &'a str {
        self.required.push(name);
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                self.missing.push(name);
                ""
            }
        }
    }

    pub(crate) fn check(self, usage: impl Into<String>) -> Result<(), ToolFailure> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ToolFailure::MissingParams {
                required: self.required,
                missing: self.missing,
                usage: usage.into(),
            })
        }
    }
}

/// Trimmed, non-empty view of an optional string parameter
pub(crate) fn optional(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Render an outcome as a single text block
pub(crate) fn reply(tool: &str, outcome: ToolOutcome) -> CallToolResult {
    if let Err(failure) = &outcome {
        match failure {
            ToolFailure::Workspace(_) | ToolFailure::Client(_) | ToolFailure::Issue(_) => {
                warn!(tool, error = %failure, "Tool call failed");
            }
            _ => warn!(tool, "Rejected tool call parameters"),
        }
    }
    text_reply(outcome.map_err(|failure| failure.to_string()))
}
