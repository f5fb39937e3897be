//! MCP Server implementation
//!
//! Three tools, each routed by an `operation` argument. Handler
//! implementations live in the handlers/ module.

use std::sync::Arc;

use mcp_common::{async_trait, EmbeddableError, EmbeddableMcp, EmbeddableResult};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router,
};
use serde_json::Value;

use crate::config::ServerConfig;
use crate::handlers::{self, AppState, SharedState};
use crate::params::{IssueParams, ProjectParams, WorkspaceParams};
use crate::workspace::WorkspaceStore;

const INSTRUCTIONS: &str = "Jira MCP Server - manage Jira workspaces (credential profiles), \
     browse projects, and work with issues: search, create, update, transition, comments, \
     attachments, links and subtasks. Start with jira_workspace(operation=\"hello\").";

/// The main Jira MCP Server
#[derive(Clone)]
pub struct JiraMcpServer {
    state: SharedState,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl JiraMcpServer {
    pub fn new(store: WorkspaceStore, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(store, config)),
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[tool(
        description = "Jira workspace management and connectivity. Operations: hello (server status and connection test), add_workspace (workspace_name, site_url, email, api_token, auth_type 'cloud'|'pat'), list_workspaces, get_active_workspace, switch_workspace, validate_workspace, remove_workspace, get_current_user, search_users (query). Site URL format: https://yourcompany.atlassian.net"
    )]
    async fn jira_workspace(
        &self,
        Parameters(params): Parameters<WorkspaceParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(handlers::dispatch_workspace(&self.state, params).await)
    }

    #[tool(
        description = "Jira projects. Operations: list (all visible projects), get (project_key: details, lead and issue types), get_issue_types (project_key)"
    )]
    async fn jira_projects(&self, Parameters(params): Parameters<ProjectParams>) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(handlers::dispatch_projects(&self.state, params).await)
    }

    #[tool(
        description = "Jira issues. Operations: search (jql), read, create (project_key, summary, issue_type), update, assign (assignee), transition (transition name or id), get_transitions, list_comments, add_comment (body), update_comment (comment_id, body), delete_comment (comment_id), list_attachments, add_attachment (file_path), delete_attachment (attachment_id), create_link (inward_issue, outward_issue, link_type), delete_link (link_id), list_links, create_subtask (parent_key, summary), list_subtasks (parent_key). Most operations take issue_key; every operation accepts workspace_name to target a non-active workspace"
    )]
    async fn jira_issues(&self, Parameters(params): Parameters<IssueParams>) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(handlers::dispatch_issues(&self.state, params).await)
    }
}

#[tool_handler]
impl rmcp::ServerHandler for JiraMcpServer {
    fn get_info(&self) -> ServerInfo {
        let config = self.state.config();
        ServerInfo {
            server_info: Implementation {
                name: config.server_name.clone(),
                version: config.server_version.clone(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl EmbeddableMcp for JiraMcpServer {
    fn server_name(&self) -> &str {
        &self.state.config().server_name
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        match name {
            "jira_workspace" => {
                let params: WorkspaceParams = serde_json::from_value(params)?;
                Ok(handlers::dispatch_workspace(&self.state, params).await)
            }
            "jira_projects" => {
                let params: ProjectParams = serde_json::from_value(params)?;
                Ok(handlers::dispatch_projects(&self.state, params).await)
            }
            "jira_issues" => {
                let params: IssueParams = serde_json::from_value(params)?;
                Ok(handlers::dispatch_issues(&self.state, params).await)
            }
            _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(dir: &tempfile::TempDir) -> JiraMcpServer {
        let store = WorkspaceStore::load(dir.path()).unwrap();
        JiraMcpServer::new(store, ServerConfig::default())
    }

    #[test]
    fn test_lists_three_tools() {
        let dir = tempfile::tempdir().unwrap();
        let tools = server(&dir).list_tools();
        let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        names.sort();
        assert_eq!(names, ["jira_issues", "jira_projects", "jira_workspace"]);
    }

    #[test]
    fn test_operation_schema_is_enumerated() {
        let dir = tempfile::tempdir().unwrap();
        let tools = server(&dir).list_tools();
        let projects = tools
            .iter()
            .find(|t| t.name == "jira_projects")
            .unwrap();
        let schema = serde_json::to_value(projects.input_schema.as_ref()).unwrap();
        assert_eq!(
            schema["properties"]["operation"]["enum"],
            serde_json::json!(["list", "get", "get_issue_types"])
        );
    }

    #[test]
    fn test_server_info_uses_config() {
        let dir = tempfile::tempdir().unwrap();
        let info = rmcp::ServerHandler::get_info(&server(&dir));
        assert_eq!(info.server_info.name, "jira-mcp");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_embedded_call_rejects_bad_params() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(&dir);
        let result = tokio_test::block_on(
            server.call_tool("jira_issues", serde_json::json!({ "max_results": "ten" })),
        );
        assert!(matches!(result, Err(EmbeddableError::InvalidParams(_))));
    }
}
