//! Issue operations adapter
//!
//! Issue CRUD, transitions, comments, attachments, links and subtasks on top
//! of an authenticated [`JiraClient`]. Every operation re-reads remote state.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::client::JiraClient;
use super::error::{IssueError, IssueResult, JiraError, JiraResult};
use super::types::{
    Attachment, Comment, CommentPage, CreatedIssue, Issue, SearchPage, Transition,
    TransitionList,
};
use super::views::{AttachmentView, CommentView, IssueView, LinkView};
use crate::workspace::AuthType;

/// Fields requested by search when the caller names none
pub const DEFAULT_SEARCH_FIELDS: &[&str] = &[
    "summary",
    "status",
    "assignee",
    "reporter",
    "priority",
    "created",
    "updated",
    "issuetype",
    "project",
    "description",
];

/// Link type used when `create_link` is given none
pub const DEFAULT_LINK_TYPE: &str = "Relates";

/// Input for [`IssueOperations::create_issue`]
#[derive(Debug, Clone, Default)]
pub struct NewIssue {
    pub project_key: String,
    pub summary: String,
    pub issue_type: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub labels: Vec<String>,
    /// Arbitrary extra fields merged last (custom fields, components, ...)
    pub extra_fields: Map<String, Value>,
}

/// Input for [`IssueOperations::update_issue`]; only `Some` fields are sent
#[derive(Debug, Clone, Default)]
pub struct IssueUpdate {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub labels: Option<Vec<String>>,
    pub extra_fields: Map<String, Value>,
}

/// Input for [`IssueOperations::create_subtask`]
#[derive(Debug, Clone, Default)]
pub struct NewSubtask {
    pub parent_key: String,
    pub summary: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
}

/// Pick the transition named (case-insensitively) or identified by `requested`
///
/// Names are compared after full Unicode lowercasing; workflow names are
/// often not English.
pub fn resolve_transition<'a>(
    available: &'a [Transition],
    requested: &str,
) -> IssueResult<&'a Transition> {
    let wanted = requested.trim();
    let wanted_lower = wanted.to_lowercase();
    available
        .iter()
        .find(|t| t.name.to_lowercase() == wanted_lower || t.id == wanted)
        .ok_or_else(|| IssueError::TransitionNotFound {
            requested: requested.to_string(),
            available: available.iter().map(|t| t.name.clone()).collect(),
        })
}

/// Search endpoint for the deployment
pub fn search_path(auth_type: AuthType) -> &'static [&'static str] {
    match auth_type {
        // Cloud retired the classic search endpoint
        AuthType::Cloud => &["search", "jql"],
        AuthType::Pat => &["search"],
    }
}

/// Body of `POST issue/{key}/transitions`; a blank comment is left out
pub fn transition_payload(transition_id: &str, comment: Option<&str>) -> Value {
    let mut payload = json!({ "transition": { "id": transition_id } });
    if let Some(body) = comment.filter(|c| !c.trim().is_empty()) {
        payload["update"] = json!({ "comment": [{ "add": { "body": body } }] });
    }
    payload
}

/// The issue a subtask is created as: the parent's project, the configured
/// subtask type and a `parent` reference
pub fn subtask_issue(subtask: NewSubtask, parent: &Issue, issue_type: &str) -> IssueResult<NewIssue> {
    let project_key = parent
        .fields
        .project
        .as_ref()
        .map(|p| p.key.clone())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| IssueError::ParentWithoutProject(subtask.parent_key.clone()))?;

    let mut extra_fields = Map::new();
    extra_fields.insert("parent".into(), json!({ "key": subtask.parent_key }));

    Ok(NewIssue {
        project_key,
        summary: subtask.summary,
        issue_type: issue_type.to_string(),
        description: subtask.description,
        assignee: subtask.assignee,
        extra_fields,
        ..Default::default()
    })
}

/// Field map for a new issue: required fields, then optional, then extras
pub fn create_fields(issue: &NewIssue, auth_type: AuthType) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("project".into(), json!({ "key": issue.project_key }));
    fields.insert("summary".into(), json!(issue.summary));
    fields.insert("issuetype".into(), json!({ "name": issue.issue_type }));

    if let Some(description) = &issue.description {
        fields.insert("description".into(), json!(description));
    }
    if let Some(assignee) = &issue.assignee {
        fields.insert(
            "assignee".into(),
            super::client::user_field(auth_type, assignee),
        );
    }
    if let Some(priority) = &issue.priority {
        fields.insert("priority".into(), json!({ "name": priority }));
    }
    if !issue.labels.is_empty() {
        fields.insert("labels".into(), json!(issue.labels));
    }

    for (key, value) in &issue.extra_fields {
        fields.insert(key.clone(), value.clone());
    }
    fields
}

/// Field map for an update; empty when nothing was supplied
pub fn update_fields(update: &IssueUpdate, auth_type: AuthType) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(summary) = &update.summary {
        fields.insert("summary".into(), json!(summary));
    }
    if let Some(description) = &update.description {
        fields.insert("description".into(), json!(description));
    }
    if let Some(assignee) = &update.assignee {
        fields.insert(
            "assignee".into(),
            super::client::user_field(auth_type, assignee),
        );
    }
    if let Some(priority) = &update.priority {
        fields.insert("priority".into(), json!({ "name": priority }));
    }
    if let Some(labels) = &update.labels {
        fields.insert("labels".into(), json!(labels));
    }
    for (key, value) in &update.extra_fields {
        fields.insert(key.clone(), value.clone());
    }
    fields
}

/// Stateless issue adapter bound to one client
pub struct IssueOperations {
    client: JiraClient,
    subtask_issue_type: String,
}

impl IssueOperations {
    pub fn new(client: JiraClient, subtask_issue_type: impl Into<String>) -> Self {
        Self {
            client,
            subtask_issue_type: subtask_issue_type.into(),
        }
    }

    fn site_url(&self) -> &str {
        self.client.site_url()
    }

    async fn fetch_issue(&self, key: &str, fields: Option<&str>) -> JiraResult<Issue> {
        let query: Vec<(&str, String)> = fields
            .map(|f| vec![("fields", f.to_string())])
            .unwrap_or_default();
        self.client.get(&["issue", key], &query).await
    }

    // ------------------------------------------------------------------------
    // Issues
    // ------------------------------------------------------------------------

    pub async fn search_issues(
        &self,
        jql: &str,
        max_results: u32,
        fields: Option<Vec<String>>,
    ) -> IssueResult<Vec<IssueView>> {
        let fields = fields
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect());
        let payload = json!({
            "jql": jql,
            "maxResults": max_results,
            "fields": fields,
        });

        let page: SearchPage = self
            .client
            .post(search_path(self.client.auth_type()), &payload)
            .await
            .map_err(|e| e.issue("search issues"))?;
        debug!(jql, found = page.issues.len(), "Search complete");

        Ok(page
            .issues
            .iter()
            .map(|issue| IssueView::summary(issue, self.site_url()))
            .collect())
    }

    pub async fn get_issue(&self, key: &str) -> IssueResult<IssueView> {
        let issue = self
            .fetch_issue(key, None)
            .await
            .map_err(|e| e.issue(format!("get issue {key}")))?;
        Ok(IssueView::detailed(&issue, self.site_url()))
    }

    pub async fn create_issue(&self, new: NewIssue) -> IssueResult<IssueView> {
        let fields = create_fields(&new, self.client.auth_type());
        let created: CreatedIssue = self
            .client
            .post(&["issue"], &json!({ "fields": fields }))
            .await
            .map_err(|e| e.issue("create issue"))?;
        info!(key = %created.key, "Created issue");

        self.get_issue(&created.key).await
    }

    pub async fn update_issue(&self, key: &str, update: IssueUpdate) -> IssueResult<IssueView> {
        let fields = update_fields(&update, self.client.auth_type());
        if fields.is_empty() {
            return Err(IssueError::NothingToUpdate(key.to_string()));
        }

        self.client
            .put_empty(&["issue", key], &json!({ "fields": fields }))
            .await
            .map_err(|e| e.issue(format!("update issue {key}")))?;
        info!(key, "Updated issue");

        self.get_issue(key).await
    }

    pub async fn assign_issue(&self, key: &str, assignee: &str) -> IssueResult<()> {
        self.client
            .put_empty(&["issue", key, "assignee"], &self.client.user_field(assignee))
            .await
            .map_err(|e| e.issue(format!("assign issue {key}")))
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    pub async fn get_transitions(&self, key: &str) -> IssueResult<Vec<Transition>> {
        let list: TransitionList = self
            .client
            .get(&["issue", key, "transitions"], &[])
            .await
            .map_err(|e| e.issue(format!("get transitions for {key}")))?;
        Ok(list.transitions)
    }

    /// Apply a transition by name or id, then return the issue as it now stands
    pub async fn transition_issue(
        &self,
        key: &str,
        transition: &str,
        comment: Option<&str>,
    ) -> IssueResult<IssueView> {
        let available = self.get_transitions(key).await?;
        let chosen = resolve_transition(&available, transition)?;

        let payload = transition_payload(&chosen.id, comment);

        self.client
            .post_empty(&["issue", key, "transitions"], &payload)
            .await
            .map_err(|e| e.issue(format!("transition issue {key}")))?;
        info!(key, transition = %chosen.name, "Transitioned issue");

        self.get_issue(key).await
    }

    // ------------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------------

    pub async fn list_comments(&self, key: &str) -> IssueResult<Vec<CommentView>> {
        let page: CommentPage = self
            .client
            .get(&["issue", key, "comment"], &[])
            .await
            .map_err(|e| e.issue(format!("list comments for {key}")))?;
        Ok(page.comments.iter().map(CommentView::from).collect())
    }

    pub async fn add_comment(&self, key: &str, body: &str) -> IssueResult<CommentView> {
        let comment: Comment = self
            .client
            .post(&["issue", key, "comment"], &json!({ "body": body }))
            .await
            .map_err(|e| e.issue(format!("add comment to {key}")))?;
        Ok(CommentView::from(&comment))
    }

    pub async fn update_comment(
        &self,
        key: &str,
        comment_id: &str,
        body: &str,
    ) -> IssueResult<CommentView> {
        let comment: Comment = self
            .client
            .put(&["issue", key, "comment", comment_id], &json!({ "body": body }))
            .await
            .map_err(|e| e.issue(format!("update comment {comment_id}")))?;
        Ok(CommentView::from(&comment))
    }

    pub async fn delete_comment(&self, key: &str, comment_id: &str) -> IssueResult<()> {
        self.client
            .delete(&["issue", key, "comment", comment_id])
            .await
            .map_err(|e| e.issue(format!("delete comment {comment_id}")))
    }

    // ------------------------------------------------------------------------
    // Attachments
    // ------------------------------------------------------------------------

    pub async fn list_attachments(&self, key: &str) -> IssueResult<Vec<AttachmentView>> {
        let issue = self
            .fetch_issue(key, Some("attachment"))
            .await
            .map_err(|e| e.issue(format!("list attachments for {key}")))?;
        Ok(issue
            .fields
            .attachment
            .iter()
            .map(AttachmentView::from)
            .collect())
    }

    /// Upload a local file; Jira answers with the created attachment(s)
    pub async fn add_attachment(&self, key: &str, file_path: &Path) -> IssueResult<Vec<AttachmentView>> {
        if !file_path.is_file() {
            return Err(IssueError::FileNotFound(file_path.to_path_buf()));
        }

        let action = format!("add attachment to {key}");
        let data = tokio::fs::read(file_path)
            .await
            .map_err(|e| JiraError::from(e).issue(action.clone()))?;
        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let mime = mime_guess::from_path(file_path).first_or_octet_stream();

        let part = Part::bytes(data)
            .file_name(filename)
            .mime_str(mime.essence_str())
            .map_err(|e| JiraError::from(e).issue(action.clone()))?;
        let form = Form::new().part("file", part);

        let created: Vec<Attachment> = self
            .client
            .post_multipart(&["issue", key, "attachments"], form)
            .await
            .map_err(|e| e.issue(action))?;
        info!(key, count = created.len(), "Uploaded attachment");

        Ok(created.iter().map(AttachmentView::from).collect())
    }

    pub async fn delete_attachment(&self, attachment_id: &str) -> IssueResult<()> {
        self.client
            .delete(&["attachment", attachment_id])
            .await
            .map_err(|e| e.issue(format!("delete attachment {attachment_id}")))
    }

    // ------------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------------

    pub async fn create_link(
        &self,
        inward_issue: &str,
        outward_issue: &str,
        link_type: Option<&str>,
    ) -> IssueResult<()> {
        let link_type = link_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_LINK_TYPE);
        let payload = json!({
            "type": { "name": link_type },
            "inwardIssue": { "key": inward_issue },
            "outwardIssue": { "key": outward_issue },
        });

        self.client
            .post_empty(&["issueLink"], &payload)
            .await
            .map_err(|e| e.issue(format!("link {inward_issue} to {outward_issue}")))
    }

    pub async fn delete_link(&self, link_id: &str) -> IssueResult<()> {
        self.client
            .delete(&["issueLink", link_id])
            .await
            .map_err(|e| e.issue(format!("delete link {link_id}")))
    }

    pub async fn list_links(&self, key: &str) -> IssueResult<Vec<LinkView>> {
        let issue = self
            .fetch_issue(key, Some("issuelinks"))
            .await
            .map_err(|e| e.issue(format!("list links for {key}")))?;
        Ok(LinkView::from_issue(&issue))
    }

    // ------------------------------------------------------------------------
    // Subtasks
    // ------------------------------------------------------------------------

    /// Create a subtask in the parent's project
    pub async fn create_subtask(&self, subtask: NewSubtask) -> IssueResult<IssueView> {
        let parent = self
            .fetch_issue(&subtask.parent_key, Some("project"))
            .await
            .map_err(|e| e.issue(format!("get parent issue {}", subtask.parent_key)))?;
        let new = subtask_issue(subtask, &parent, &self.subtask_issue_type)?;
        self.create_issue(new).await
    }

    pub async fn list_subtasks(&self, parent_key: &str) -> IssueResult<Vec<IssueView>> {
        let parent = self
            .fetch_issue(parent_key, Some("subtasks"))
            .await
            .map_err(|e| e.issue(format!("list subtasks for {parent_key}")))?;
        Ok(parent
            .fields
            .subtasks
            .iter()
            .map(|stub| IssueView::from_stub(stub, self.site_url()))
            .collect())
    }
}
