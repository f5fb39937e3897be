//! Parameters for `jira_workspace`

use mcp_common::{operation_schema, operations};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};

operations! {
    /// Operations of the workspace tool
    pub enum WorkspaceOperation {
        Hello => "hello",
        AddWorkspace => "add_workspace",
        ListWorkspaces => "list_workspaces",
        GetActiveWorkspace => "get_active_workspace",
        SwitchWorkspace => "switch_workspace",
        ValidateWorkspace => "validate_workspace",
        RemoveWorkspace => "remove_workspace",
        GetCurrentUser => "get_current_user",
        SearchUsers => "search_users",
    }
}

fn workspace_operation_schema(_: &mut SchemaGenerator) -> Schema {
    operation_schema::<WorkspaceOperation>()
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkspaceParams {
    #[serde(default)]
    #[schemars(schema_with = "workspace_operation_schema")]
    pub operation: Option<String>,

    #[serde(default)]
    #[schemars(
        description = "Workspace name (alphanumeric and dashes). Required for add/switch/remove; optional elsewhere to target a non-active workspace"
    )]
    pub workspace_name: Option<String>,

    #[serde(default)]
    #[schemars(description = "Jira site URL, e.g. 'company.atlassian.net' (add_workspace)")]
    pub site_url: Option<String>,

    #[serde(default)]
    #[schemars(description = "Account email for Jira Cloud, or username for Server (add_workspace)")]
    pub email: Option<String>,

    #[serde(default)]
    #[schemars(description = "API token (Cloud) or Personal Access Token (Server) (add_workspace)")]
    pub api_token: Option<String>,

    #[serde(default)]
    #[schemars(description = "Authentication type: 'cloud' (default) or 'pat'")]
    pub auth_type: Option<String>,

    #[serde(default)]
    #[schemars(description = "Name or email fragment to search for (search_users)")]
    pub query: Option<String>,

    #[serde(default)]
    #[schemars(description = "Maximum number of users to return (search_users, default 50)")]
    pub max_results: Option<u32>,
}
