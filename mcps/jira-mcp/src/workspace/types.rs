//! Workspace records and validation rules

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{WorkspaceError, WorkspaceResult};

/// Longest accepted workspace name
pub const MAX_NAME_LEN: usize = 50;

/// Shortest accepted API token / PAT
pub const MIN_SECRET_LEN: usize = 10;

/// How requests to a Jira site are authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Jira Cloud: email + API token over basic auth
    #[default]
    Cloud,
    /// Jira Server/Data Center: Personal Access Token as a bearer token
    Pat,
}

impl AuthType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthType::Cloud => "cloud",
            AuthType::Pat => "pat",
        }
    }

    /// Parse the tool-facing spelling, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cloud" => Some(AuthType::Cloud),
            "pat" => Some(AuthType::Pat),
            _ => None,
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored credential profile, persisted as `<name>.json`
#[derive(Clone, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub name: String,
    pub site_url: String,
    /// Email (Cloud) or username (Server); may be empty for PAT auth
    #[serde(default, alias = "email")]
    pub identity: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub auth_type: AuthType,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub last_validated: Option<DateTime<Utc>>,
}

impl fmt::Debug for WorkspaceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceRecord")
            .field("name", &self.name)
            .field("site_url", &self.site_url)
            .field("identity", &self.identity)
            .field("api_token", &"<redacted>")
            .field("auth_type", &self.auth_type)
            .field("created", &self.created)
            .field("last_validated", &self.last_validated)
            .finish()
    }
}

/// Everything needed to open a Jira client
#[derive(Clone)]
pub struct Credentials {
    pub workspace: String,
    pub site_url: String,
    pub identity: String,
    pub api_token: String,
    pub auth_type: AuthType,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("workspace", &self.workspace)
            .field("site_url", &self.site_url)
            .field("identity", &self.identity)
            .field("auth_type", &self.auth_type)
            .finish_non_exhaustive()
    }
}

/// Input for [`WorkspaceStore::add_workspace`](super::WorkspaceStore::add_workspace)
#[derive(Clone)]
pub struct NewWorkspace {
    pub name: String,
    pub site_url: String,
    pub identity: String,
    pub api_token: String,
    pub auth_type: AuthType,
}

/// A record as seen by listings, with its active flag
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSummary {
    pub name: String,
    pub site_url: String,
    pub identity: String,
    pub auth_type: AuthType,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub last_validated: Option<DateTime<Utc>>,
}

impl WorkspaceSummary {
    pub(crate) fn from_record(record: &WorkspaceRecord, active: bool) -> Self {
        Self {
            name: record.name.clone(),
            site_url: record.site_url.clone(),
            identity: record.identity.clone(),
            auth_type: record.auth_type,
            active,
            created: record.created,
            last_validated: record.last_validated,
        }
    }
}

/// Result of switching the active workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    AlreadyActive { name: String, site_url: String },
    Switched { name: String, site_url: String },
}

/// Result of removing a workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: String,
    /// Workspace that became active because the removed one was active
    pub activated: Option<String>,
}

/// Check a workspace name: 1-50 ASCII alphanumerics or dashes, no leading/trailing dash
pub fn is_valid_workspace_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    if name.starts_with('-') || name.ends_with('-') {
        return false;
    }
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

pub(crate) fn validate_workspace_name(name: &str) -> WorkspaceResult<()> {
    if is_valid_workspace_name(name) {
        Ok(())
    } else {
        Err(WorkspaceError::Validation(format!(
            "Invalid workspace name format: '{name}'. Must be alphanumeric with dashes, \
             1-{MAX_NAME_LEN} characters, not starting/ending with dash."
        )))
    }
}

/// Normalize a Jira site URL: trim, drop trailing slashes, default to `https://`
pub fn normalize_site_url(site_url: &str) -> WorkspaceResult<String> {
    let trimmed = site_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(WorkspaceError::Validation("Site URL cannot be empty".to_string()));
    }

    let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = url::Url::parse(&normalized)
        .map_err(|e| WorkspaceError::Validation(format!("Invalid site URL '{site_url}': {e}")))?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(WorkspaceError::Validation(format!(
            "Invalid site URL '{site_url}': missing host"
        )));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_name_rules() {
        assert!(is_valid_workspace_name("abc-123"));
        assert!(is_valid_workspace_name("a"));
        assert!(is_valid_workspace_name(&"x".repeat(50)));

        assert!(!is_valid_workspace_name(""));
        assert!(!is_valid_workspace_name("-abc"));
        assert!(!is_valid_workspace_name("abc-"));
        assert!(!is_valid_workspace_name(&"x".repeat(51)));
        assert!(!is_valid_workspace_name("a/b"));
        assert!(!is_valid_workspace_name("a b"));
        assert!(!is_valid_workspace_name("café"));
    }

    #[test]
    fn test_normalize_site_url() {
        assert_eq!(
            normalize_site_url("company.atlassian.net").unwrap(),
            "https://company.atlassian.net"
        );
        assert_eq!(
            normalize_site_url("https://company.atlassian.net///").unwrap(),
            "https://company.atlassian.net"
        );
        assert_eq!(
            normalize_site_url("http://jira.internal:8080").unwrap(),
            "http://jira.internal:8080"
        );
        assert!(matches!(
            normalize_site_url("  "),
            Err(WorkspaceError::Validation(_))
        ));
    }

    #[test]
    fn test_auth_type_parse() {
        assert_eq!(AuthType::parse("PAT"), Some(AuthType::Pat));
        assert_eq!(AuthType::parse("cloud"), Some(AuthType::Cloud));
        assert_eq!(AuthType::parse("oauth"), None);
    }

    #[test]
    fn test_record_debug_redacts_token() {
        let record = WorkspaceRecord {
            name: "w1".into(),
            site_url: "https://x.atlassian.net".into(),
            identity: "a@b.com".into(),
            api_token: "supersecrettoken".into(),
            auth_type: AuthType::Cloud,
            created: Utc::now(),
            last_validated: None,
        };
        let debug = format!("{record:?}");
        assert!(!debug.contains("supersecrettoken"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_record_reads_legacy_email_key() {
        let json = serde_json::json!({
            "name": "old",
            "site_url": "https://old.atlassian.net",
            "email": "me@old.com",
            "api_token": "tokentokentoken",
            "created": "2024-05-01T10:00:00Z"
        });
        let record: WorkspaceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.identity, "me@old.com");
        assert_eq!(record.auth_type, AuthType::Cloud);
        assert!(record.last_validated.is_none());
    }
}
