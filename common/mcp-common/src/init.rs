//! Server initialization utilities
//!
//! Tracing setup shared by the MCP servers in this workspace. Stdout is
//! reserved for the MCP protocol, so every layer writes to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging for an MCP server
///
/// - `RUST_LOG` directives are honoured first
/// - the server crate itself logs at `info`, or `debug` when `debug` is set
/// - `LOG_FORMAT=json` switches to structured JSON lines
///
/// # Example
///
/// ```rust,ignore
/// mcp_common::init_tracing("jira_mcp", false)?;
/// ```
pub fn init_tracing(crate_name: &str, debug: bool) -> anyhow::Result<()> {
    let level = if debug { "debug" } else { "info" };
    let directive = format!("{}={}", crate_name, level);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}
