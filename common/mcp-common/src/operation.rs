//! Closed operation sets for multi-operation tools
//!
//! Some tools expose a single MCP tool with an `operation` argument instead
//! of one tool per action. The [`operations!`] macro declares the set once:
//! the enum, its wire names, and the JSON-Schema `enum` all come from the
//! same list, and an exhaustive `match` on the enum in the dispatcher makes
//! the compiler check that every advertised operation has a handler.
//!
//! ```rust,ignore
//! mcp_common::operations! {
//!     pub enum ProjectOperation {
//!         List => "list",
//!         Get => "get",
//!     }
//! }
//!
//! assert_eq!(ProjectOperation::parse("get"), Some(ProjectOperation::Get));
//! ```

use schemars::{json_schema, Schema};

/// A closed set of named operations
pub trait Operation: Copy + Sized + 'static {
    /// Every operation in declaration order
    const ALL: &'static [Self];

    /// Wire name used in the `operation` argument
    fn name(self) -> &'static str;

    /// Look up an operation by its wire name
    fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// All wire names in declaration order
    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|op| op.name()).collect()
    }

    /// Wire names joined for human-readable listings
    fn listing() -> String {
        Self::names().join(", ")
    }
}

/// JSON-Schema for an `operation` string restricted to `O`'s names
///
/// Intended for `#[schemars(schema_with = "...")]` on a parameter field.
pub fn operation_schema<O: Operation>() -> Schema {
    json_schema!({
        "type": "string",
        "enum": O::names(),
        "description": "Operation to perform"
    })
}

/// Declare an operation enum together with its wire names
#[macro_export]
macro_rules! operations {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::Operation for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::Operation::name(*self))
            }
        }
    };
}
