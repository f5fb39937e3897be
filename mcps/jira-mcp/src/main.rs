//! Jira MCP Server
//!
//! Exposes Jira workspaces, projects and issues as MCP tools over stdio.
//!
//! # Usage
//!
//! Run directly: `jira-mcp` (same as `jira-mcp serve`)
//!
//! Prepare a workspace file to fill in by hand:
//! `jira-mcp init-workspace acme --site-url acme.atlassian.net`
//!
//! Or configure in `.mcp.json`:
//! ```json
//! { "mcpServers": { "jira": { "command": "./jira-mcp" } } }
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rmcp::{transport::stdio, ServiceExt};

use jira_mcp::{AuthType, JiraMcpServer, ServerConfig, WorkspaceStore};

#[derive(Parser)]
#[command(name = "jira-mcp")]
#[command(about = "MCP server for Jira Cloud and Server/Data Center", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// MCP transport
    #[arg(long, value_enum, default_value_t = Transport::Stdio, global = true)]
    transport: Transport,

    /// Configuration file (default: ./.env)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Workspace store directory (default: <config dir>/jira-mcp)
    #[arg(long, env = "JIRA_MCP_HOME", global = true)]
    home: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the MCP tools (default)
    Serve,
    /// Write a workspace file with empty credentials to complete by hand
    InitWorkspace {
        /// Workspace name (alphanumeric and dashes)
        name: String,

        /// Jira site URL
        #[arg(long)]
        site_url: String,

        /// Authentication type
        #[arg(long, value_enum, default_value_t = AuthArg::Cloud)]
        auth_type: AuthArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Transport {
    Stdio,
}

#[derive(Clone, Copy, ValueEnum)]
enum AuthArg {
    Cloud,
    Pat,
}

impl From<AuthArg> for AuthType {
    fn from(arg: AuthArg) -> Self {
        match arg {
            AuthArg::Cloud => AuthType::Cloud,
            AuthArg::Pat => AuthType::Pat,
        }
    }
}

fn debug_from_env() -> bool {
    std::env::var("DEBUG")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol; logs go to stderr
    mcp_common::init_tracing("jira_mcp", cli.debug || debug_from_env())?;

    let mut config = ServerConfig::load(cli.env_file.as_deref())?;
    config.debug |= cli.debug;
    if let Some(home) = cli.home {
        config.home = home;
    }

    let mut store = WorkspaceStore::load(config.home.clone())?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::InitWorkspace {
            name,
            site_url,
            auth_type,
        } => {
            let path = store.create_workspace_skeleton(&name, &site_url, auth_type.into())?;
            println!("Created workspace '{name}'");
            println!("Edit {} to add your credentials", path.display());
            Ok(())
        }
        Commands::Serve => match cli.transport {
            Transport::Stdio => serve(store, config).await,
        },
    }
}

async fn serve(store: WorkspaceStore, config: ServerConfig) -> Result<()> {
    tracing::info!(
        "Starting {} v{} ({} workspace(s) in {})",
        config.server_name,
        config.server_version,
        store.len(),
        config.home.display()
    );
    match store.active_name() {
        Some(name) => tracing::info!("Active workspace: {name}"),
        None => tracing::warn!("No active workspace - add one with jira_workspace(operation='add_workspace')"),
    }

    let server = JiraMcpServer::new(store, config);
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
