//! Reply helpers for MCP tool responses
//!
//! Tools in this workspace answer with a single text block. Failures are
//! still returned as a result (flagged with `is_error`) so the calling
//! runtime never sees a protocol-level error for a domain problem.

use rmcp::model::{CallToolResult, Content};

/// Create a successful plain text response
///
/// ```rust,ignore
/// use mcp_common::text_success;
///
/// fn my_tool(&self) -> CallToolResult {
///     text_success("Operation completed successfully")
/// }
/// ```
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Create a plain text response flagged as a tool error
pub fn text_error(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}

/// Fold a handler outcome into a single text block
///
/// `Ok` text becomes a success block, `Err` text an error block.
pub fn text_reply(outcome: Result<String, String>) -> CallToolResult {
    match outcome {
        Ok(text) => text_success(text),
        Err(text) => text_error(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_success() {
        let result = text_success("hello world");
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 1);
    }

    #[test]
    fn test_text_error_is_flagged() {
        let result = text_error("boom");
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 1);
    }

    #[test]
    fn test_text_reply() {
        assert!(!text_reply(Ok("fine".into())).is_error.unwrap_or(false));
        assert_eq!(text_reply(Err("bad".into())).is_error, Some(true));
    }
}
