//! Human-readable interchange format.

pub mod lexer;
mod parser;
mod writer;

use indexmap::IndexMap;
use trellis_core::Node;

pub use parser::parse_document;
pub use writer::write_document;

/// Leading keyword of every document.
pub const HEADER_KEYWORD: &str = "trellis";

/// Version written in the header. Readers accept any minor of the same major.
pub const FORMAT_VERSION: (u16, u16) = (1, 0);

/// A parsed document with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDocument {
    pub meta: IndexMap<String, String>,
    pub root: Node,
}

/// Options for the text writer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Entries of the `@meta` block. Omitted when empty.
    pub metadata: IndexMap<String, String>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            metadata: IndexMap::new(),
        }
    }
}

impl TextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Add a metadata entry. Keys that are not identifiers are quoted.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
