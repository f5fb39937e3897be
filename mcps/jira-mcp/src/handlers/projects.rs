//! `jira_projects` handlers

use mcp_common::CallToolResult;

use super::{format, optional, reply, resolve_operation, AppState, Required, ToolOutcome};
use crate::params::{ProjectOperation, ProjectParams};

pub async fn dispatch_projects(state: &AppState, params: ProjectParams) -> CallToolResult {
    reply("jira_projects", route(state, params).await)
}

async fn route(state: &AppState, params: ProjectParams) -> ToolOutcome {
    let operation = resolve_operation::<ProjectOperation>(params.operation.as_deref())?;
    match operation {
        ProjectOperation::List => list(state, &params).await,
        ProjectOperation::Get => get(state, &params).await,
        ProjectOperation::GetIssueTypes => get_issue_types(state, &params).await,
    }
}

async fn list(state: &AppState, params: &ProjectParams) -> ToolOutcome {
    let client = state.client(optional(&params.workspace_name)).await?;
    Ok(format::project_list(&client.get_projects().await?))
}

async fn get(state: &AppState, params: &ProjectParams) -> ToolOutcome {
    let mut required = Required::new();
    let key = required.field("project_key", params.project_key.as_deref());
    required.check("jira_projects(operation=\"get\", project_key=\"PROJ\")")?;

    let client = state.client(optional(&params.workspace_name)).await?;
    Ok(format::project_detail(&client.get_project(key).await?))
}

async fn get_issue_types(state: &AppState, params: &ProjectParams) -> ToolOutcome {
    let mut required = Required::new();
    let key = required.field("project_key", params.project_key.as_deref());
    required.check("jira_projects(operation=\"get_issue_types\", project_key=\"PROJ\")")?;

    let client = state.client(optional(&params.workspace_name)).await?;
    Ok(format::issue_types(key, &client.get_issue_types(key).await?))
}
