//! Parameters for `jira_projects`

use mcp_common::{operation_schema, operations};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};

operations! {
    /// Operations of the projects tool
    pub enum ProjectOperation {
        List => "list",
        Get => "get",
        GetIssueTypes => "get_issue_types",
    }
}

fn project_operation_schema(_: &mut SchemaGenerator) -> Schema {
    operation_schema::<ProjectOperation>()
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProjectParams {
    #[serde(default)]
    #[schemars(schema_with = "project_operation_schema")]
    pub operation: Option<String>,

    #[serde(default)]
    #[schemars(description = "Project key, e.g. 'PROJ' (get, get_issue_types)")]
    pub project_key: Option<String>,

    #[serde(default)]
    #[schemars(description = "Workspace to use instead of the active one")]
    pub workspace_name: Option<String>,
}
