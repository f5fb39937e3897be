//! Error types for Jira REST operations
//!
//! [`JiraError`] is what a single HTTP exchange can fail with. The adapters
//! wrap it with the action they were attempting: [`ClientError`] for the
//! client adapter, [`IssueError`] for issue operations.

use std::path::PathBuf;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failure of a single REST exchange
#[derive(Error, Debug)]
pub enum JiraError {
    /// Jira answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Api { status: StatusCode, message: String },

    /// The request never produced a response
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local file access failed
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl JiraError {
    /// Build an API error from a status and raw body, preferring Jira's error fields
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        Self::Api {
            status,
            message: remote_error_text(status, body),
        }
    }

    /// Attach the attempted action, producing a client-adapter error
    pub fn client(self, action: impl Into<String>) -> ClientError {
        let action = action.into();
        match self {
            JiraError::Api { message, .. } => ClientError::Remote { action, message },
            other => ClientError::Unexpected {
                action,
                message: other.to_string(),
            },
        }
    }

    /// Attach the attempted action, producing an issue-operation error
    pub fn issue(self, action: impl Into<String>) -> IssueError {
        let action = action.into();
        match self {
            JiraError::Api { message, .. } => IssueError::Remote { action, message },
            other => IssueError::Unexpected {
                action,
                message: other.to_string(),
            },
        }
    }
}

/// Jira's standard error envelope
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Extract human-readable text from a Jira error body
pub fn remote_error_text(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let mut parts = parsed.error_messages;
        for (field, value) in parsed.errors {
            match value.as_str() {
                Some(text) => parts.push(format!("{field}: {text}")),
                None => parts.push(format!("{field}: {value}")),
            }
        }
        if let Some(message) = parsed.message {
            parts.push(message);
        }
        if !parts.is_empty() {
            return parts.join("; ");
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        trimmed.chars().take(500).collect()
    }
}

/// Client adapter failure (authentication, transport, server metadata, users, projects)
#[derive(Error, Debug)]
pub enum ClientError {
    /// Jira rejected the request; carries Jira's own error text
    #[error("Failed to {action}: {message}")]
    Remote { action: String, message: String },

    /// Anything else that went wrong while talking to Jira
    #[error("Unexpected error while trying to {action}: {message}")]
    Unexpected { action: String, message: String },

    /// The client could not be constructed
    #[error("Invalid Jira client configuration: {0}")]
    Config(String),
}

/// Issue operation failure
#[derive(Error, Debug)]
pub enum IssueError {
    /// Jira rejected the request; carries Jira's own error text
    #[error("Failed to {action}: {message}")]
    Remote { action: String, message: String },

    /// Anything else that went wrong while talking to Jira
    #[error("Unexpected error while trying to {action}: {message}")]
    Unexpected { action: String, message: String },

    /// No available transition matches the requested name or id
    #[error("Transition '{requested}' not found. Available: {}", .available.join(", "))]
    TransitionNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// The attachment source file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// An update call supplied no fields
    #[error("Nothing to update for {0}: supply at least one field")]
    NothingToUpdate(String),

    /// The parent of a new subtask came back without a project
    #[error("Parent issue {0} has no project; cannot create a subtask under it")]
    ParentWithoutProject(String),
}

/// Result type alias for raw REST exchanges
pub type JiraResult<T> = Result<T, JiraError>;

/// Result type alias for client adapter calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for issue operations
pub type IssueResult<T> = Result<T, IssueError>;
