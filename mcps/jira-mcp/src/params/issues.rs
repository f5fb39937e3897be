//! Parameters for `jira_issues`

use mcp_common::{operation_schema, operations};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

operations! {
    /// Operations of the issues tool
    pub enum IssueOperation {
        Search => "search",
        Read => "read",
        Create => "create",
        Update => "update",
        Assign => "assign",
        Transition => "transition",
        GetTransitions => "get_transitions",
        ListComments => "list_comments",
        AddComment => "add_comment",
        UpdateComment => "update_comment",
        DeleteComment => "delete_comment",
        ListAttachments => "list_attachments",
        AddAttachment => "add_attachment",
        DeleteAttachment => "delete_attachment",
        CreateLink => "create_link",
        DeleteLink => "delete_link",
        ListLinks => "list_links",
        CreateSubtask => "create_subtask",
        ListSubtasks => "list_subtasks",
    }
}

fn issue_operation_schema(_: &mut SchemaGenerator) -> Schema {
    operation_schema::<IssueOperation>()
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct IssueParams {
    #[serde(default)]
    #[schemars(schema_with = "issue_operation_schema")]
    pub operation: Option<String>,

    #[serde(default)]
    #[schemars(description = "Workspace to use instead of the active one")]
    pub workspace_name: Option<String>,

    #[serde(default)]
    #[schemars(description = "Issue key, e.g. 'PROJ-123'")]
    pub issue_key: Option<String>,

    // search
    #[serde(default)]
    #[schemars(description = "JQL query (search)")]
    pub jql: Option<String>,

    #[serde(default)]
    #[schemars(description = "Maximum results (search, default 50)")]
    pub max_results: Option<u32>,

    #[serde(default)]
    #[schemars(description = "Fields to return (search); defaults to the common set")]
    pub fields: Option<Vec<String>>,

    // create / update
    #[serde(default)]
    #[schemars(description = "Project key (create)")]
    pub project_key: Option<String>,

    #[serde(default)]
    #[schemars(description = "Issue summary (create, update, create_subtask)")]
    pub summary: Option<String>,

    #[serde(default)]
    #[schemars(description = "Issue type name, e.g. 'Task', 'Bug' (create)")]
    pub issue_type: Option<String>,

    #[serde(default)]
    #[schemars(description = "Issue description (create, update, create_subtask)")]
    pub description: Option<String>,

    #[serde(default)]
    #[schemars(
        description = "Assignee: account ID on Cloud, username on Server (create, update, assign, create_subtask)"
    )]
    pub assignee: Option<String>,

    #[serde(default)]
    #[schemars(description = "Priority name, e.g. 'High' (create, update)")]
    pub priority: Option<String>,

    #[serde(default)]
    #[schemars(description = "Labels (create, update)")]
    pub labels: Option<Vec<String>>,

    #[serde(default)]
    #[schemars(description = "Additional raw Jira fields as a JSON object (create, update)")]
    pub extra_fields: Option<Value>,

    // transitions
    #[serde(default)]
    #[schemars(description = "Transition name or ID (transition)")]
    pub transition: Option<String>,

    #[serde(default)]
    #[schemars(description = "Comment to add while transitioning (transition)")]
    pub comment: Option<String>,

    // comments
    #[serde(default)]
    #[schemars(description = "Comment ID (update_comment, delete_comment)")]
    pub comment_id: Option<String>,

    #[serde(default)]
    #[schemars(description = "Comment text (add_comment, update_comment)")]
    pub body: Option<String>,

    // attachments
    #[serde(default)]
    #[schemars(description = "Local path of the file to upload (add_attachment)")]
    pub file_path: Option<String>,

    #[serde(default)]
    #[schemars(description = "Attachment ID (delete_attachment)")]
    pub attachment_id: Option<String>,

    // links
    #[serde(default)]
    #[schemars(description = "Inward issue key (create_link)")]
    pub inward_issue: Option<String>,

    #[serde(default)]
    #[schemars(description = "Outward issue key (create_link)")]
    pub outward_issue: Option<String>,

    #[serde(default)]
    #[schemars(description = "Link type name (create_link, default 'Relates')")]
    pub link_type: Option<String>,

    #[serde(default)]
    #[schemars(description = "Link ID (delete_link)")]
    pub link_id: Option<String>,

    // subtasks
    #[serde(default)]
    #[schemars(description = "Parent issue key (create_subtask, list_subtasks)")]
    pub parent_key: Option<String>,
}
