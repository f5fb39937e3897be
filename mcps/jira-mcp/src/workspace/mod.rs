//! Workspace credential store
//!
//! Named Jira credential profiles persisted one file per workspace, with a
//! pointer to the workspace used when a tool call names none.

pub mod error;
pub mod store;
pub mod types;

pub use error::{WorkspaceError, WorkspaceResult};
pub use store::WorkspaceStore;
pub use types::{
    is_valid_workspace_name, normalize_site_url, AuthType, Credentials, NewWorkspace,
    RemoveOutcome, SwitchOutcome, WorkspaceRecord, WorkspaceSummary,
};
