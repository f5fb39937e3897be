//! `jira_workspace` handlers

use mcp_common::CallToolResult;
use tracing::{info, warn};

use super::{format, optional, reply, resolve_operation, AppState, Required, ToolFailure, ToolOutcome};
use crate::jira::JiraClient;
use crate::params::{WorkspaceOperation, WorkspaceParams};
use crate::workspace::{AuthType, NewWorkspace, SwitchOutcome};

const DEFAULT_USER_RESULTS: u32 = 50;

pub async fn dispatch_workspace(state: &AppState, params: WorkspaceParams) -> CallToolResult {
    reply("jira_workspace", route(state, params).await)
}

async fn route(state: &AppState, params: WorkspaceParams) -> ToolOutcome {
    let operation = resolve_operation::<WorkspaceOperation>(params.operation.as_deref())?;
    match operation {
        WorkspaceOperation::Hello => hello(state).await,
        WorkspaceOperation::AddWorkspace => add_workspace(state, &params).await,
        WorkspaceOperation::ListWorkspaces => list_workspaces(state).await,
        WorkspaceOperation::GetActiveWorkspace => get_active_workspace(state).await,
        WorkspaceOperation::SwitchWorkspace => switch_workspace(state, &params).await,
        WorkspaceOperation::ValidateWorkspace => validate_workspace(state, &params).await,
        WorkspaceOperation::RemoveWorkspace => remove_workspace(state, &params).await,
        WorkspaceOperation::GetCurrentUser => get_current_user(state, &params).await,
        WorkspaceOperation::SearchUsers => search_users(state, &params).await,
    }
}

fn server_banner(state: &AppState) -> String {
    let config = state.config();
    format!(
        "**Server**: {} v{}\n**Status**: Running",
        config.server_name, config.server_version
    )
}

/// Server status, plus a live connection check when a workspace is active
async fn hello(state: &AppState) -> ToolOutcome {
    let active = state.store().await.get_active_workspace().cloned();
    let Some(active) = active else {
        return Ok(format!(
            "✅ **Jira MCP Server Status**\n\n{}\n**Workspaces**: No workspaces configured\n\nℹ️ Add a workspace to get started:\n```\n{}\n```",
            server_banner(state),
            format::ADD_WORKSPACE_EXAMPLE
        ));
    };

    let workspace_lines = format!(
        "**Active Workspace**: {}\n**Jira Site**: {}",
        active.name, active.site_url
    );

    let check = match state.client(Some(active.name.as_str())).await {
        Ok(client) => client.test_connection().await.map_err(ToolFailure::from),
        Err(failure) => Err(failure),
    };

    Ok(match check {
        Ok(info) => format!(
            "✅ **Jira MCP Server Status**\n\n{}\n\n{workspace_lines}\n{}\n\n✅ Jira API connection: OK",
            server_banner(state),
            format::connection(&info)
        ),
        Err(failure) => {
            warn!(workspace = %active.name, "Connection check failed");
            format!(
                "⚠️ **Jira MCP Server Status**\n\n{}\n\n{workspace_lines}\n\n{failure}\n\nCheck your credentials and network connectivity.",
                server_banner(state)
            )
        }
    })
}

async fn add_workspace(state: &AppState, params: &WorkspaceParams) -> ToolOutcome {
    let auth_type = match optional(&params.auth_type) {
        None => AuthType::Cloud,
        Some(raw) => AuthType::parse(raw).ok_or_else(|| {
            ToolFailure::InvalidParam(format!("auth_type must be 'cloud' or 'pat', got '{raw}'"))
        })?,
    };

    let mut required = Required::new();
    let name = required.field("workspace_name", params.workspace_name.as_deref());
    let site_url = required.field("site_url", params.site_url.as_deref());
    let identity = match auth_type {
        AuthType::Cloud => required.field("email", params.email.as_deref()),
        AuthType::Pat => optional(&params.email).unwrap_or_default(),
    };
    let api_token = required.field("api_token", params.api_token.as_deref());
    required.check(format::ADD_WORKSPACE_EXAMPLE)?;

    let summary = state.store().await.add_workspace(NewWorkspace {
        name: name.to_string(),
        site_url: site_url.to_string(),
        identity: identity.to_string(),
        api_token: api_token.to_string(),
        auth_type,
    })?;

    let details = format!(
        "**Site URL**: {}\n**Identity**: {}\n**Auth Type**: {}\n**Active**: {}",
        summary.site_url,
        if summary.identity.is_empty() { "N/A" } else { summary.identity.as_str() },
        summary.auth_type,
        format::yes_no(summary.active)
    );

    let check = match state.client(Some(summary.name.as_str())).await {
        Ok(client) => client.test_connection().await.map_err(ToolFailure::from),
        Err(failure) => Err(failure),
    };

    Ok(match check {
        Ok(info) => format!(
            "✅ **Workspace '{}' Added Successfully**\n\n{details}\n\n**Jira Connection**: ✅ OK\n{}\n\nYou can now use Jira operations with this workspace.",
            summary.name,
            format::connection(&info)
        ),
        Err(failure) => format!(
            "⚠️ **Workspace '{}' Added (with warnings)**\n\n{details}\n\n⚠️ **Jira Connection Test Failed**: {failure}\n\nThe workspace was saved, but the connection test failed. Please verify your credentials and network connectivity.",
            summary.name
        ),
    })
}

async fn list_workspaces(state: &AppState) -> ToolOutcome {
    let workspaces = state.store().await.list_workspaces();
    if workspaces.is_empty() {
        return Ok(format::no_workspaces());
    }
    Ok(format::workspace_list(&workspaces))
}

async fn get_active_workspace(state: &AppState) -> ToolOutcome {
    let store = state.store().await;
    Ok(match store.get_active_workspace() {
        Some(record) => format::active_workspace(record),
        None => "⚠️ **No Active Workspace**\n\nNo workspace is currently active. Add a workspace or switch to an existing one:\n```\njira_workspace(operation=\"list_workspaces\")\njira_workspace(operation=\"switch_workspace\", workspace_name=\"<name>\")\n```".to_string(),
    })
}

async fn switch_workspace(state: &AppState, params: &WorkspaceParams) -> ToolOutcome {
    let mut required = Required::new();
    let name = required.field("workspace_name", params.workspace_name.as_deref());
    required.check("jira_workspace(operation=\"switch_workspace\", workspace_name=\"mycompany\")")?;

    let outcome = state.store().await.switch_workspace(name)?;
    Ok(match outcome {
        SwitchOutcome::AlreadyActive { name, site_url } => format!(
            "✅ **Workspace '{name}' is already active**\n\n**Workspace**: {name}\n**Site URL**: {site_url}"
        ),
        SwitchOutcome::Switched { name, site_url } => format!(
            "✅ **Switched to workspace '{name}'**\n\n**Workspace**: {name}\n**Site URL**: {site_url}"
        ),
    })
}

/// Query the server and the authenticated user, then stamp `last_validated`
async fn validate_workspace(state: &AppState, params: &WorkspaceParams) -> ToolOutcome {
    let credentials = state.credentials(optional(&params.workspace_name)).await?;
    let client = JiraClient::new(&credentials, state.config().request_timeout)?;

    let info = client.test_connection().await?;
    let user = client.get_current_user().await?;
    state.store().await.mark_validated(&credentials.workspace)?;
    info!(workspace = %credentials.workspace, "Workspace validated");

    Ok(format!(
        "✅ **Workspace '{}' Validation Successful**\n\n**Site**: {}\n{}\n\n**Authenticated User**: {}\n**Email**: {}\n**Account ID**: {}\n**Status**: {}\n\n✅ All connectivity tests passed",
        credentials.workspace,
        credentials.site_url,
        format::connection(&info),
        user.display_name,
        user.email.as_deref().unwrap_or("N/A"),
        user.account_id,
        if user.active { "Active" } else { "Inactive" }
    ))
}

async fn remove_workspace(state: &AppState, params: &WorkspaceParams) -> ToolOutcome {
    let mut required = Required::new();
    let name = required.field("workspace_name", params.workspace_name.as_deref());
    required.check("jira_workspace(operation=\"remove_workspace\", workspace_name=\"mycompany\")")?;

    let outcome = state.store().await.remove_workspace(name)?;
    let mut text = format!("✅ **Workspace '{}' removed**", outcome.removed);
    if let Some(next) = outcome.activated {
        text.push_str(&format!("\n\n**Active workspace is now**: {next}"));
    }
    Ok(text)
}

async fn get_current_user(state: &AppState, params: &WorkspaceParams) -> ToolOutcome {
    let client = state.client(optional(&params.workspace_name)).await?;
    let user = client.get_current_user().await?;
    Ok(format::user(
        &format!("Current User ({})", client.workspace()),
        &user,
    ))
}

async fn search_users(state: &AppState, params: &WorkspaceParams) -> ToolOutcome {
    let mut required = Required::new();
    let query = required.field("query", params.query.as_deref());
    required.check("jira_workspace(operation=\"search_users\", query=\"john\")")?;

    let limit = params.max_results.unwrap_or(DEFAULT_USER_RESULTS).max(1);
    let client = state.client(optional(&params.workspace_name)).await?;
    let users = client.search_users(query, limit).await?;
    Ok(format::user_list(query, &users))
}
