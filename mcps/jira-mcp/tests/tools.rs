//! In-process tool calls against a temporary workspace store
//!
//! Every call here is answered before any request reaches Jira.

use jira_mcp::workspace::NewWorkspace;
use jira_mcp::{AuthType, JiraMcpServer, ServerConfig, WorkspaceStore};
use mcp_common::{CallToolResult, EmbeddableError, EmbeddableMcp};
use serde_json::{json, Value};
use tempfile::TempDir;

fn server() -> (TempDir, JiraMcpServer) {
    let dir = tempfile::tempdir().unwrap();
    let store = WorkspaceStore::load(dir.path()).unwrap();
    let config = ServerConfig {
        home: dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    (dir, JiraMcpServer::new(store, config))
}

async fn add(server: &JiraMcpServer, name: &str) {
    server
        .state()
        .store()
        .await
        .add_workspace(NewWorkspace {
            name: name.to_string(),
            site_url: format!("{name}.atlassian.net"),
            identity: format!("me@{name}.com"),
            api_token: "tokentokentoken".to_string(),
            auth_type: AuthType::Cloud,
        })
        .unwrap();
}

async fn call(server: &JiraMcpServer, tool: &str, args: Value) -> CallToolResult {
    server.call_tool(tool, args).await.unwrap()
}

fn text(result: &CallToolResult) -> String {
    assert_eq!(result.content.len(), 1);
    let block = serde_json::to_value(&result.content[0]).unwrap();
    block["text"].as_str().unwrap().to_string()
}

fn is_error(result: &CallToolResult) -> bool {
    result.is_error.unwrap_or(false)
}

#[tokio::test]
async fn test_missing_operation_lists_operations() {
    let (_dir, server) = server();
    let result = call(&server, "jira_issues", json!({ "issue_key": "ED-1" })).await;

    assert!(is_error(&result));
    let text = text(&result);
    assert!(text.contains("Missing required parameter 'operation'"));
    assert!(text.contains("search, read, create, update"));
}

#[tokio::test]
async fn test_unknown_operation_is_a_text_reply() {
    let (_dir, server) = server();
    let result = call(&server, "jira_projects", json!({ "operation": "delete" })).await;

    assert!(is_error(&result));
    let text = text(&result);
    assert!(text.contains("**Invalid Operation**: 'delete'"));
    assert!(text.contains("list, get, get_issue_types"));
}

#[tokio::test]
async fn test_create_without_summary_reports_missing_parameters() {
    let (_dir, server) = server();
    add(&server, "acme").await;

    let result = call(
        &server,
        "jira_issues",
        json!({ "operation": "create", "project_key": "ED", "issue_type": "Bug" }),
    )
    .await;

    assert!(is_error(&result));
    let text = text(&result);
    assert!(text.contains("Missing Required Parameters"));
    assert!(text.contains("Missing: summary"));
    assert!(text.contains("operation=\"create\""));
}

#[tokio::test]
async fn test_unknown_tool_is_rejected() {
    let (_dir, server) = server();
    let result = server.call_tool("jira_boards", json!({})).await;
    assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
}

#[tokio::test]
async fn test_hello_without_workspaces() {
    let (_dir, server) = server();
    let result = call(&server, "jira_workspace", json!({ "operation": "hello" })).await;

    assert!(!is_error(&result));
    let text = text(&result);
    assert!(text.contains("Jira MCP Server Status"));
    assert!(text.contains("No workspaces configured"));
}

#[tokio::test]
async fn test_list_workspaces_shows_active_first() {
    let (_dir, server) = server();

    let empty = call(&server, "jira_workspace", json!({ "operation": "list_workspaces" })).await;
    assert!(text(&empty).contains("No Workspaces Configured"));

    add(&server, "zeta").await;
    add(&server, "alpha").await;

    let result = call(&server, "jira_workspace", json!({ "operation": "list_workspaces" })).await;
    let text = text(&result);
    assert!(text.contains("✓ **zeta** (ACTIVE)"));
    assert!(text.contains("Site: https://zeta.atlassian.net"));
    assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
    assert!(text.ends_with("**Total workspaces**: 2"));
}

#[tokio::test]
async fn test_get_active_workspace() {
    let (_dir, server) = server();
    let none = call(&server, "jira_workspace", json!({ "operation": "get_active_workspace" })).await;
    assert!(text(&none).contains("No Active Workspace"));

    add(&server, "acme").await;
    let some = call(&server, "jira_workspace", json!({ "operation": "get_active_workspace" })).await;
    let text = text(&some);
    assert!(text.contains("**Active Workspace**: acme"));
    assert!(text.contains("**Email**: me@acme.com"));
}

#[tokio::test]
async fn test_credentialed_call_without_workspace() {
    let (_dir, server) = server();
    let result = call(
        &server,
        "jira_issues",
        json!({ "operation": "read", "issue_key": "ED-1" }),
    )
    .await;

    assert!(is_error(&result));
    let text = text(&result);
    assert!(text.contains("Workspace Error"));
    assert!(text.contains("No active workspace"));
}

#[tokio::test]
async fn test_unknown_named_workspace() {
    let (_dir, server) = server();
    add(&server, "acme").await;

    let result = call(
        &server,
        "jira_projects",
        json!({ "operation": "list", "workspace_name": "other" }),
    )
    .await;

    assert!(is_error(&result));
    assert!(text(&result).contains("Workspace 'other' not found"));
}

#[tokio::test]
async fn test_switch_and_remove_workspaces() {
    let (_dir, server) = server();
    add(&server, "acme").await;
    add(&server, "beta").await;

    let same = call(
        &server,
        "jira_workspace",
        json!({ "operation": "switch_workspace", "workspace_name": "acme" }),
    )
    .await;
    assert!(text(&same).contains("already active"));

    let switched = call(
        &server,
        "jira_workspace",
        json!({ "operation": "switch_workspace", "workspace_name": "beta" }),
    )
    .await;
    assert!(text(&switched).contains("Switched to workspace 'beta'"));

    let removed = call(
        &server,
        "jira_workspace",
        json!({ "operation": "remove_workspace", "workspace_name": "beta" }),
    )
    .await;
    let text = text(&removed);
    assert!(text.contains("Workspace 'beta' removed"));
    assert!(text.contains("**Active workspace is now**: acme"));

    assert_eq!(server.state().store().await.active_name(), Some("acme"));
}

#[tokio::test]
async fn test_switch_requires_name() {
    let (_dir, server) = server();
    let result = call(&server, "jira_workspace", json!({ "operation": "switch_workspace" })).await;
    assert!(is_error(&result));
    assert!(text(&result).contains("Missing: workspace_name"));
}

#[tokio::test]
async fn test_add_workspace_validation() {
    let (_dir, server) = server();

    let missing = call(
        &server,
        "jira_workspace",
        json!({ "operation": "add_workspace", "workspace_name": "acme", "site_url": "acme.atlassian.net" }),
    )
    .await;
    let missing = text(&missing);
    assert!(missing.contains("Missing: email, api_token"));

    let bad_auth = call(
        &server,
        "jira_workspace",
        json!({ "operation": "add_workspace", "auth_type": "oauth" }),
    )
    .await;
    assert!(text(&bad_auth).contains("auth_type must be 'cloud' or 'pat'"));

    let bad_name = call(
        &server,
        "jira_workspace",
        json!({
            "operation": "add_workspace",
            "workspace_name": "-acme",
            "site_url": "acme.atlassian.net",
            "email": "me@acme.com",
            "api_token": "tokentokentoken"
        }),
    )
    .await;
    assert!(is_error(&bad_name));
    assert!(text(&bad_name).contains("Invalid workspace name format"));
    assert!(server.state().store().await.is_empty());
}

#[tokio::test]
async fn test_update_without_fields_sends_nothing() {
    let (_dir, server) = server();
    add(&server, "acme").await;

    let result = call(
        &server,
        "jira_issues",
        json!({ "operation": "update", "issue_key": "ED-1" }),
    )
    .await;

    assert!(is_error(&result));
    assert!(text(&result).contains("Nothing to update for ED-1"));
}

#[tokio::test]
async fn test_add_attachment_missing_file() {
    let (dir, server) = server();
    add(&server, "acme").await;
    let path = dir.path().join("missing.png");

    let result = call(
        &server,
        "jira_issues",
        json!({
            "operation": "add_attachment",
            "issue_key": "ED-1",
            "file_path": path.to_string_lossy()
        }),
    )
    .await;

    assert!(is_error(&result));
    assert!(text(&result).contains("File not found"));
}

#[tokio::test]
async fn test_skeleton_workspace_needs_token() {
    let (_dir, server) = server();
    server
        .state()
        .store()
        .await
        .create_workspace_skeleton("draft", "draft.atlassian.net", AuthType::Cloud)
        .unwrap();

    let result = call(&server, "jira_projects", json!({ "operation": "list" })).await;
    assert!(is_error(&result));
    let text = text(&result);
    assert!(text.contains("has no API token yet"));
    assert!(text.contains("draft.json"));
}

#[tokio::test]
async fn test_extra_fields_must_be_object() {
    let (_dir, server) = server();
    add(&server, "acme").await;

    let result = call(
        &server,
        "jira_issues",
        json!({
            "operation": "create",
            "project_key": "ED",
            "summary": "Broken",
            "issue_type": "Bug",
            "extra_fields": "customfield_1=2"
        }),
    )
    .await;

    assert!(is_error(&result));
    assert!(text(&result).contains("extra_fields must be a JSON object"));
}
