//! Jira REST (v2) response types
//!
//! Only the fields this server reads are modelled; everything else in the
//! payloads is ignored. Fields Jira may omit are defaulted.

use serde::{Deserialize, Serialize};

/// A Jira user, resolved once into its Cloud or Server shape
///
/// Cloud identifies users by `accountId`; Server/Data Center by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawUser", into = "RawUser")]
pub enum UserRef {
    Cloud {
        account_id: String,
        display_name: String,
        email: Option<String>,
        active: bool,
    },
    Server {
        name: String,
        display_name: String,
        email: Option<String>,
        active: bool,
    },
}

impl UserRef {
    /// `accountId` on Cloud, `name` on Server
    pub fn id(&self) -> &str {
        match self {
            UserRef::Cloud { account_id, .. } => account_id,
            UserRef::Server { name, .. } => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            UserRef::Cloud { display_name, .. } | UserRef::Server { display_name, .. } => {
                display_name
            }
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            UserRef::Cloud { email, .. } | UserRef::Server { email, .. } => email.as_deref(),
        }
    }

    pub fn active(&self) -> bool {
        match self {
            UserRef::Cloud { active, .. } | UserRef::Server { active, .. } => *active,
        }
    }
}

/// Wire shape shared by Cloud and Server user objects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email_address: Option<String>,
    #[serde(default)]
    active: Option<bool>,
}

impl From<RawUser> for UserRef {
    fn from(raw: RawUser) -> Self {
        let display_name = raw.display_name.unwrap_or_else(|| "Unknown".to_string());
        let email = raw.email_address.filter(|e| !e.is_empty());
        let active = raw.active.unwrap_or(true);

        match raw.account_id {
            Some(account_id) => UserRef::Cloud {
                account_id,
                display_name,
                email,
                active,
            },
            None => UserRef::Server {
                name: raw.name.or(raw.key).unwrap_or_else(|| "N/A".to_string()),
                display_name,
                email,
                active,
            },
        }
    }
}

impl From<UserRef> for RawUser {
    fn from(user: UserRef) -> Self {
        match user {
            UserRef::Cloud {
                account_id,
                display_name,
                email,
                active,
            } => RawUser {
                account_id: Some(account_id),
                display_name: Some(display_name),
                email_address: email,
                active: Some(active),
                ..Default::default()
            },
            UserRef::Server {
                name,
                display_name,
                email,
                active,
            } => RawUser {
                name: Some(name),
                display_name: Some(display_name),
                email_address: email,
                active: Some(active),
                ..Default::default()
            },
        }
    }
}

/// Anything Jira represents as `{ "name": ... }` (status, priority, type, component, version)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Named {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// `GET /rest/api/2/serverInfo`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub server_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub project_type_key: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lead: Option<UserRef>,
    #[serde(default)]
    pub issue_types: Vec<IssueType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subtask: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<Named>,
    #[serde(default)]
    pub issuetype: Option<Named>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub assignee: Option<UserRef>,
    #[serde(default)]
    pub reporter: Option<UserRef>,
    #[serde(default)]
    pub priority: Option<Named>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub components: Vec<Named>,
    #[serde(default)]
    pub fix_versions: Vec<Named>,
    #[serde(default)]
    pub attachment: Vec<Attachment>,
    #[serde(default)]
    pub issuelinks: Vec<IssueLink>,
    #[serde(default)]
    pub subtasks: Vec<IssueStub>,
}

/// The trimmed issue embedded in links and subtask lists
#[derive(Debug, Clone, Deserialize)]
pub struct IssueStub {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: StubFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StubFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<Named>,
    #[serde(default)]
    pub assignee: Option<UserRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// `GET /rest/api/2/issue/{key}/comment`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLink {
    pub id: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    #[serde(default)]
    pub inward_issue: Option<IssueStub>,
    #[serde(default)]
    pub outward_issue: Option<IssueStub>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inward: Option<String>,
    #[serde(default)]
    pub outward: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub to: Option<Named>,
}

/// `GET /rest/api/2/issue/{key}/transitions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionList {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// Search response, shared by `/search` and `/search/jql`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// `POST /rest/api/2/issue`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}
