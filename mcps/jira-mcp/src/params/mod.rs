//! Parameter types for the Jira MCP tools
//!
//! Each tool takes an `operation` plus the union of its operations' fields.
//! `operation` is read as a plain string so a missing or unknown value can be
//! answered with a readable message instead of a deserialization failure.

mod issues;
mod projects;
mod workspace;

pub use issues::*;
pub use projects::*;
pub use workspace::*;
