//! Flattened projections of Jira payloads
//!
//! These are what the adapters hand back to the tool handlers. Every view is
//! derived from a live response; nothing here is cached.

use serde::Serialize;

use super::types::{
    Attachment, Comment, Issue, IssueStub, IssueType, Named, Project, ServerInfo, UserRef,
};

/// Result of a connection check
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub success: bool,
    pub server_title: String,
    pub version: String,
    pub base_url: String,
}

impl ConnectionInfo {
    pub fn from_server_info(info: ServerInfo, site_url: &str) -> Self {
        Self {
            success: true,
            server_title: info.server_title.unwrap_or_else(|| "Jira".to_string()),
            version: info.version.unwrap_or_else(|| "Unknown".to_string()),
            base_url: info.base_url.unwrap_or_else(|| site_url.to_string()),
        }
    }
}

/// A user as shown to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    /// `accountId` on Cloud, username on Server
    pub account_id: String,
    pub email: Option<String>,
    pub display_name: String,
    pub active: bool,
}

impl From<&UserRef> for UserSummary {
    fn from(user: &UserRef) -> Self {
        Self {
            account_id: user.id().to_string(),
            email: user.email().map(str::to_string),
            display_name: user.display_name().to_string(),
            active: user.active(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub key: String,
    pub name: String,
    pub id: String,
    pub project_type: Option<String>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            key: project.key.clone(),
            name: project.name.clone(),
            id: project.id.clone(),
            project_type: project.project_type_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueTypeView {
    pub id: String,
    pub name: String,
    pub subtask: bool,
    pub description: Option<String>,
}

impl From<&IssueType> for IssueTypeView {
    fn from(kind: &IssueType) -> Self {
        Self {
            id: kind.id.clone(),
            name: kind.name.clone(),
            subtask: kind.subtask,
            description: kind.description.clone().filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub summary: ProjectSummary,
    pub description: Option<String>,
    pub lead: Option<String>,
    pub issue_types: Vec<IssueTypeView>,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            summary: ProjectSummary::from(project),
            description: project.description.clone().filter(|d| !d.is_empty()),
            lead: project.lead.as_ref().map(|u| u.display_name().to_string()),
            issue_types: project.issue_types.iter().map(IssueTypeView::from).collect(),
        }
    }
}

/// One issue, flattened
///
/// Search results fill the summary fields; [`IssueView::detailed`] also
/// carries labels, components and fix versions.
#[derive(Debug, Clone, Serialize)]
pub struct IssueView {
    pub key: String,
    pub id: String,
    pub url: String,
    pub summary: String,
    pub status: String,
    pub issue_type: String,
    pub project: String,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub priority: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub fix_versions: Vec<String>,
}

fn name_of(named: &Option<Named>, fallback: &str) -> String {
    named
        .as_ref()
        .map(|n| n.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn names(items: &[Named]) -> Vec<String> {
    items.iter().map(|n| n.name.clone()).collect()
}

/// Browser URL for an issue key
pub fn browse_url(site_url: &str, key: &str) -> String {
    format!("{}/browse/{}", site_url.trim_end_matches('/'), key)
}

impl IssueView {
    /// Summary projection used by search and subtask listings
    pub fn summary(issue: &Issue, site_url: &str) -> Self {
        let fields = &issue.fields;
        Self {
            key: issue.key.clone(),
            id: issue.id.clone(),
            url: browse_url(site_url, &issue.key),
            summary: fields.summary.clone().unwrap_or_default(),
            status: name_of(&fields.status, "Unknown"),
            issue_type: name_of(&fields.issuetype, "Unknown"),
            project: fields
                .project
                .as_ref()
                .map(|p| p.key.clone())
                .unwrap_or_default(),
            assignee: fields.assignee.as_ref().map(|u| u.display_name().to_string()),
            reporter: fields.reporter.as_ref().map(|u| u.display_name().to_string()),
            priority: fields.priority.as_ref().map(|p| p.name.clone()),
            created: fields.created.clone(),
            updated: fields.updated.clone(),
            description: fields.description.clone().filter(|d| !d.is_empty()),
            labels: Vec::new(),
            components: Vec::new(),
            fix_versions: Vec::new(),
        }
    }

    /// Full projection used by read, create, update and transition
    pub fn detailed(issue: &Issue, site_url: &str) -> Self {
        let fields = &issue.fields;
        Self {
            labels: fields.labels.clone(),
            components: names(&fields.components),
            fix_versions: names(&fields.fix_versions),
            ..Self::summary(issue, site_url)
        }
    }

    /// Lightweight projection of an embedded stub (subtasks, links)
    pub fn from_stub(stub: &IssueStub, site_url: &str) -> Self {
        Self {
            key: stub.key.clone(),
            id: stub.id.clone(),
            url: browse_url(site_url, &stub.key),
            summary: stub.fields.summary.clone().unwrap_or_default(),
            status: name_of(&stub.fields.status, "Unknown"),
            issue_type: String::new(),
            project: String::new(),
            assignee: stub
                .fields
                .assignee
                .as_ref()
                .map(|u| u.display_name().to_string()),
            reporter: None,
            priority: None,
            created: None,
            updated: None,
            description: None,
            labels: Vec::new(),
            components: Vec::new(),
            fix_versions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub body: String,
    pub author: String,
    pub created: Option<String>,
    pub updated: Option<String>,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            body: comment.body.clone(),
            author: comment
                .author
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            created: comment.created.clone(),
            updated: comment.updated.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentView {
    pub id: String,
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub created: Option<String>,
    pub author: String,
    pub content_url: Option<String>,
}

impl From<&Attachment> for AttachmentView {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id.clone(),
            filename: attachment.filename.clone(),
            size: attachment.size,
            mime_type: attachment
                .mime_type
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            created: attachment.created.clone(),
            author: attachment
                .author
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            content_url: attachment.content.clone(),
        }
    }
}

/// Which side of a link the other issue sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Inward,
    Outward,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    pub id: String,
    pub link_type: String,
    pub direction: LinkDirection,
    /// Relationship phrase as Jira words it, e.g. "is blocked by"
    pub relation: String,
    pub related_issue_key: String,
    pub related_summary: String,
}

impl LinkView {
    /// Links of an issue, tagged with the direction of the related issue
    pub fn from_issue(issue: &Issue) -> Vec<Self> {
        issue
            .fields
            .issuelinks
            .iter()
            .filter_map(|link| {
                let (direction, related, relation) =
                    match (&link.inward_issue, &link.outward_issue) {
                        (Some(inward), _) => (
                            LinkDirection::Inward,
                            inward,
                            link.link_type.inward.clone(),
                        ),
                        (None, Some(outward)) => (
                            LinkDirection::Outward,
                            outward,
                            link.link_type.outward.clone(),
                        ),
                        (None, None) => return None,
                    };
                Some(Self {
                    id: link.id.clone(),
                    link_type: link.link_type.name.clone(),
                    direction,
                    relation: relation.unwrap_or_else(|| link.link_type.name.clone()),
                    related_issue_key: related.key.clone(),
                    related_summary: related.fields.summary.clone().unwrap_or_default(),
                })
            })
            .collect()
    }
}
