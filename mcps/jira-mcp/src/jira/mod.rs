//! Jira REST layer
//!
//! - [`client`]: authenticated client adapter (server info, users, projects)
//! - [`issues`]: issue operations adapter
//! - [`types`]: wire types, including the Cloud/Server [`UserRef`]
//! - [`views`]: flattened projections returned to the tool handlers

pub mod client;
pub mod error;
pub mod issues;
pub mod types;
pub mod views;

pub use client::{user_agent, user_field, JiraClient};
pub use error::{ClientError, ClientResult, IssueError, IssueResult, JiraError, JiraResult};
pub use issues::{
    resolve_transition, search_path, subtask_issue, transition_payload, IssueOperations,
    IssueUpdate, NewIssue, NewSubtask, DEFAULT_LINK_TYPE,
};
pub use types::{Transition, UserRef};
pub use views::{
    AttachmentView, CommentView, ConnectionInfo, IssueTypeView, IssueView, LinkDirection,
    LinkView, ProjectSummary, ProjectView, UserSummary,
};
