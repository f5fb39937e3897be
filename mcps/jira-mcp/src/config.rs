//! Configuration loading for jira-mcp
//!
//! Values are resolved in this order, later sources winning:
//! 1. Built-in defaults
//! 2. A `.env`-style file (default `./.env`)
//! 3. Process environment variables with the same names
//!
//! CLI flags are applied on top by `main`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// Default `.env` file looked up in the working directory
pub const DEFAULT_ENV_FILE: &str = ".env";

const KEYS: &[&str] = &[
    "MCP_SERVER_NAME",
    "MCP_SERVER_VERSION",
    "DEBUG",
    "JIRA_MCP_HOME",
    "JIRA_REQUEST_TIMEOUT_SECS",
    "JIRA_SUBTASK_ISSUE_TYPE",
];

/// Runtime configuration for the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name advertised during MCP initialization
    pub server_name: String,
    /// Version advertised during MCP initialization
    pub server_version: String,
    /// Verbose logging
    pub debug: bool,
    /// Root of the workspace store
    pub home: PathBuf,
    /// Per-request timeout applied to the HTTP client
    pub request_timeout: Duration,
    /// Issue type name used when creating subtasks
    pub subtask_issue_type: String,
}

fn default_home() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jira-mcp")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: "jira-mcp".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            debug: false,
            home: default_home(),
            request_timeout: Duration::from_secs(30),
            subtask_issue_type: "Sub-task".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an env file (if present) and the process environment
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        let path = env_file.unwrap_or_else(|| Path::new(DEFAULT_ENV_FILE));

        let mut values = if path.exists() {
            tracing::info!("Loading config from: {}", path.display());
            read_env_file(path)?
        } else {
            tracing::warn!("No {} file found - using default configuration", path.display());
            tracing::warn!("Configure workspaces with jira_workspace(operation='add_workspace')");
            HashMap::new()
        };

        // Environment variables (highest priority)
        for key in KEYS {
            if let Ok(value) = std::env::var(key) {
                values.insert((*key).to_string(), value);
            }
        }

        Self::from_values(&values)
    }

    /// Build a config from raw key/value pairs, ignoring unknown keys
    pub fn from_values(values: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();
        let get = |key: &str| lookup(values, key);

        if let Some(name) = get("MCP_SERVER_NAME") {
            config.server_name = name.to_string();
        }
        if let Some(version) = get("MCP_SERVER_VERSION") {
            config.server_version = version.to_string();
        }
        if let Some(debug) = get("DEBUG") {
            config.debug = matches!(debug.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(home) = get("JIRA_MCP_HOME") {
            config.home = PathBuf::from(home);
        }
        if let Some(secs) = get("JIRA_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("JIRA_REQUEST_TIMEOUT_SECS is not a number: {secs}"))?;
            if secs == 0 {
                anyhow::bail!("JIRA_REQUEST_TIMEOUT_SECS must be at least 1");
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(kind) = get("JIRA_SUBTASK_ISSUE_TYPE") {
            config.subtask_issue_type = kind.to_string();
        }

        Ok(config)
    }
}

fn lookup<'a>(values: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    values.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenv::from_path_iter(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut values = HashMap::new();
    for item in iter {
        let (key, value) =
            item.with_context(|| format!("Failed to parse {}", path.display()))?;
        values.insert(key, value);
    }
    Ok(values)
}
