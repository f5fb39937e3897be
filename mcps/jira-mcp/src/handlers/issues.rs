//! `jira_issues` handlers

use std::path::Path;

use mcp_common::CallToolResult;
use serde_json::{Map, Value};

use super::{format, optional, reply, resolve_operation, AppState, Required, ToolFailure, ToolOutcome};
use crate::jira::{IssueOperations, IssueUpdate, NewIssue, NewSubtask, DEFAULT_LINK_TYPE};
use crate::params::{IssueOperation, IssueParams};

const DEFAULT_SEARCH_RESULTS: u32 = 50;

pub async fn dispatch_issues(state: &AppState, params: IssueParams) -> CallToolResult {
    reply("jira_issues", route(state, params).await)
}

async fn route(state: &AppState, params: IssueParams) -> ToolOutcome {
    let operation = resolve_operation::<IssueOperation>(params.operation.as_deref())?;
    let p = &params;
    match operation {
        IssueOperation::Search => search(state, p).await,
        IssueOperation::Read => read(state, p).await,
        IssueOperation::Create => create(state, p).await,
        IssueOperation::Update => update(state, p).await,
        IssueOperation::Assign => assign(state, p).await,
        IssueOperation::Transition => transition(state, p).await,
        IssueOperation::GetTransitions => get_transitions(state, p).await,
        IssueOperation::ListComments => list_comments(state, p).await,
        IssueOperation::AddComment => add_comment(state, p).await,
        IssueOperation::UpdateComment => update_comment(state, p).await,
        IssueOperation::DeleteComment => delete_comment(state, p).await,
        IssueOperation::ListAttachments => list_attachments(state, p).await,
        IssueOperation::AddAttachment => add_attachment(state, p).await,
        IssueOperation::DeleteAttachment => delete_attachment(state, p).await,
        IssueOperation::CreateLink => create_link(state, p).await,
        IssueOperation::DeleteLink => delete_link(state, p).await,
        IssueOperation::ListLinks => list_links(state, p).await,
        IssueOperation::CreateSubtask => create_subtask(state, p).await,
        IssueOperation::ListSubtasks => list_subtasks(state, p).await,
    }
}

async fn operations(state: &AppState, params: &IssueParams) -> Result<IssueOperations, ToolFailure> {
    state.issue_operations(optional(&params.workspace_name)).await
}

/// `extra_fields` must be a JSON object when present
fn extra_fields(params: &IssueParams) -> Result<Map<String, Value>, ToolFailure> {
    match &params.extra_fields {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(ToolFailure::InvalidParam(format!(
            "extra_fields must be a JSON object, got {other}"
        ))),
    }
}

/// Shared guard for the many operations that need only `issue_key`
fn issue_key<'a>(params: &'a IssueParams, operation: &str) -> Result<&'a str, ToolFailure> {
    let mut required = Required::new();
    let key = required.field("issue_key", params.issue_key.as_deref());
    required.check(format!(
        "jira_issues(operation=\"{operation}\", issue_key=\"PROJ-123\")"
    ))?;
    Ok(key)
}

// ============================================================================
// Issues
// ============================================================================

async fn search(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let jql = required.field("jql", params.jql.as_deref());
    required.check("jira_issues(operation=\"search\", jql=\"project = PROJ AND status = 'In Progress'\", max_results=20)")?;

    let limit = params.max_results.unwrap_or(DEFAULT_SEARCH_RESULTS).max(1);
    let issues = operations(state, params)
        .await?
        .search_issues(jql, limit, params.fields.clone())
        .await?;
    Ok(format::issue_list(jql, &issues))
}

async fn read(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let key = issue_key(params, "read")?;
    let issue = operations(state, params).await?.get_issue(key).await?;
    Ok(format::issue_detail("📄 **Issue Details**", &issue))
}

async fn create(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let project_key = required.field("project_key", params.project_key.as_deref());
    let summary = required.field("summary", params.summary.as_deref());
    let issue_type = required.field("issue_type", params.issue_type.as_deref());
    required.check("jira_issues(operation=\"create\", project_key=\"PROJ\", summary=\"Fix login bug\", issue_type=\"Bug\", description=\"Steps to reproduce...\")")?;

    let new = NewIssue {
        project_key: project_key.to_string(),
        summary: summary.to_string(),
        issue_type: issue_type.to_string(),
        description: optional(&params.description).map(str::to_string),
        assignee: optional(&params.assignee).map(str::to_string),
        priority: optional(&params.priority).map(str::to_string),
        labels: params.labels.clone().unwrap_or_default(),
        extra_fields: extra_fields(params)?,
    };

    let issue = operations(state, params).await?.create_issue(new).await?;
    Ok(format::issue_detail(
        &format!("✅ **Issue {} Created**", issue.key),
        &issue,
    ))
}

async fn update(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let key = issue_key(params, "update")?;
    let update = IssueUpdate {
        summary: optional(&params.summary).map(str::to_string),
        description: params.description.clone(),
        assignee: optional(&params.assignee).map(str::to_string),
        priority: optional(&params.priority).map(str::to_string),
        labels: params.labels.clone(),
        extra_fields: extra_fields(params)?,
    };

    let issue = operations(state, params)
        .await?
        .update_issue(key, update)
        .await?;
    Ok(format::issue_detail(
        &format!("✅ **Issue {} Updated**", issue.key),
        &issue,
    ))
}

async fn assign(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let key = required.field("issue_key", params.issue_key.as_deref());
    let assignee = required.field("assignee", params.assignee.as_deref());
    required.check("jira_issues(operation=\"assign\", issue_key=\"PROJ-123\", assignee=\"<account id or username>\")")?;

    operations(state, params)
        .await?
        .assign_issue(key, assignee)
        .await?;
    Ok(format!("✅ **{key}** assigned to {assignee}"))
}

// ============================================================================
// Transitions
// ============================================================================

async fn transition(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let key = required.field("issue_key", params.issue_key.as_deref());
    let requested = required.field("transition", params.transition.as_deref());
    required.check("jira_issues(operation=\"transition\", issue_key=\"PROJ-123\", transition=\"In Progress\")")?;

    let issue = operations(state, params)
        .await?
        .transition_issue(key, requested, optional(&params.comment))
        .await?;
    Ok(format::issue_detail(
        &format!("✅ **{} transitioned** → {}", issue.key, issue.status),
        &issue,
    ))
}

async fn get_transitions(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let key = issue_key(params, "get_transitions")?;
    let transitions = operations(state, params).await?.get_transitions(key).await?;
    Ok(format::transitions(key, &transitions))
}

// ============================================================================
// Comments
// ============================================================================

async fn list_comments(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let key = issue_key(params, "list_comments")?;
    let comments = operations(state, params).await?.list_comments(key).await?;
    Ok(format::comments(key, &comments))
}

async fn add_comment(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let key = required.field("issue_key", params.issue_key.as_deref());
    let body = required.field("body", params.body.as_deref());
    required.check("jira_issues(operation=\"add_comment\", issue_key=\"PROJ-123\", body=\"Looks good\")")?;

    let comment = operations(state, params)
        .await?
        .add_comment(key, body)
        .await?;
    Ok(format::comment(&format!("✅ **Comment added to {key}**"), &comment))
}

async fn update_comment(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let key = required.field("issue_key", params.issue_key.as_deref());
    let comment_id = required.field("comment_id", params.comment_id.as_deref());
    let body = required.field("body", params.body.as_deref());
    required.check("jira_issues(operation=\"update_comment\", issue_key=\"PROJ-123\", comment_id=\"10001\", body=\"Updated text\")")?;

    let comment = operations(state, params)
        .await?
        .update_comment(key, comment_id, body)
        .await?;
    Ok(format::comment(
        &format!("✅ **Comment {comment_id} updated on {key}**"),
        &comment,
    ))
}

async fn delete_comment(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let key = required.field("issue_key", params.issue_key.as_deref());
    let comment_id = required.field("comment_id", params.comment_id.as_deref());
    required.check("jira_issues(operation=\"delete_comment\", issue_key=\"PROJ-123\", comment_id=\"10001\")")?;

    operations(state, params)
        .await?
        .delete_comment(key, comment_id)
        .await?;
    Ok(format!("✅ **Comment {comment_id} deleted from {key}**"))
}

// ============================================================================
// Attachments
// ============================================================================

async fn list_attachments(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let key = issue_key(params, "list_attachments")?;
    let attachments = operations(state, params)
        .await?
        .list_attachments(key)
        .await?;
    Ok(format::attachments(key, &attachments))
}

async fn add_attachment(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let key = required.field("issue_key", params.issue_key.as_deref());
    let file_path = required.field("file_path", params.file_path.as_deref());
    required.check("jira_issues(operation=\"add_attachment\", issue_key=\"PROJ-123\", file_path=\"/path/to/screenshot.png\")")?;

    let uploaded = operations(state, params)
        .await?
        .add_attachment(key, Path::new(file_path))
        .await?;
    Ok(format!(
        "✅ **Attachment uploaded to {key}**\n\n{}",
        format::attachments(key, &uploaded)
    ))
}

async fn delete_attachment(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let attachment_id = required.field("attachment_id", params.attachment_id.as_deref());
    required.check("jira_issues(operation=\"delete_attachment\", attachment_id=\"10010\")")?;

    operations(state, params)
        .await?
        .delete_attachment(attachment_id)
        .await?;
    Ok(format!("✅ **Attachment {attachment_id} deleted**"))
}

// ============================================================================
// Links
// ============================================================================

async fn create_link(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let inward = required.field("inward_issue", params.inward_issue.as_deref());
    let outward = required.field("outward_issue", params.outward_issue.as_deref());
    required.check("jira_issues(operation=\"create_link\", inward_issue=\"PROJ-1\", outward_issue=\"PROJ-2\", link_type=\"Blocks\")")?;

    let link_type = optional(&params.link_type).unwrap_or(DEFAULT_LINK_TYPE);
    operations(state, params)
        .await?
        .create_link(inward, outward, Some(link_type))
        .await?;
    Ok(format!(
        "✅ **Linked {inward} → {outward}** ({link_type})"
    ))
}

async fn delete_link(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let link_id = required.field("link_id", params.link_id.as_deref());
    required.check("jira_issues(operation=\"delete_link\", link_id=\"10001\")")?;

    operations(state, params).await?.delete_link(link_id).await?;
    Ok(format!("✅ **Link {link_id} deleted**"))
}

async fn list_links(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let key = issue_key(params, "list_links")?;
    let links = operations(state, params).await?.list_links(key).await?;
    Ok(format::links(key, &links))
}

// ============================================================================
// Subtasks
// ============================================================================

async fn create_subtask(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let parent_key = required.field("parent_key", params.parent_key.as_deref());
    let summary = required.field("summary", params.summary.as_deref());
    required.check("jira_issues(operation=\"create_subtask\", parent_key=\"PROJ-123\", summary=\"Write tests\")")?;

    let subtask = operations(state, params)
        .await?
        .create_subtask(NewSubtask {
            parent_key: parent_key.to_string(),
            summary: summary.to_string(),
            description: optional(&params.description).map(str::to_string),
            assignee: optional(&params.assignee).map(str::to_string),
        })
        .await?;
    Ok(format::issue_detail(
        &format!("✅ **Subtask {} created under {parent_key}**", subtask.key),
        &subtask,
    ))
}

async fn list_subtasks(state: &AppState, params: &IssueParams) -> ToolOutcome {
    let mut required = Required::new();
    let parent_key = required.field("parent_key", params.parent_key.as_deref());
    required.check("jira_issues(operation=\"list_subtasks\", parent_key=\"PROJ-123\")")?;

    let subtasks = operations(state, params)
        .await?
        .list_subtasks(parent_key)
        .await?;
    Ok(format::subtasks(parent_key, &subtasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_fields_accepts_objects_only() {
        let mut params = IssueParams::default();
        assert!(extra_fields(&params).unwrap().is_empty());

        params.extra_fields = Some(json!({ "customfield_10010": 3 }));
        assert_eq!(extra_fields(&params).unwrap()["customfield_10010"], json!(3));

        params.extra_fields = Some(json!([1, 2]));
        assert!(matches!(
            extra_fields(&params),
            Err(ToolFailure::InvalidParam(_))
        ));
    }

    #[test]
    fn test_issue_key_guard() {
        let params = IssueParams::default();
        let text = issue_key(&params, "read").unwrap_err().to_string();
        assert!(text.contains("Missing: issue_key"));
        assert!(text.contains("operation=\"read\""));
    }
}
