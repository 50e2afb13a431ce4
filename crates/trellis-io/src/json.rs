//! JSON interchange through the serde derives on the core types.
//!
//! serde_json limits nesting to 128 levels, and every tree level costs two
//! (the node object and its `children` array), so this codec is meant for
//! tooling and fixtures rather than arbitrarily deep trees.

use trellis_core::{FormatError, Node, ParseError};

/// Deepest tree the JSON codec writes; anything deeper would not read back.
pub const MAX_JSON_DEPTH: usize = 60;

/// Serialize `root` as pretty-printed JSON.
///
/// Trees deeper than [`MAX_JSON_DEPTH`] are refused with
/// [`FormatError::Encode`].
pub fn write_json(root: &Node) -> Result<String, FormatError> {
    let depth = root.depth();
    if depth > MAX_JSON_DEPTH {
        return Err(FormatError::Encode {
            message: format!("tree is {depth} levels deep; json holds at most {MAX_JSON_DEPTH}"),
        });
    }
    serde_json::to_string_pretty(root).map_err(|e| FormatError::Encode { message: e.to_string() })
}

/// Parse a tree and check it the same way the other readers do.
pub fn read_json(input: &str) -> Result<Node, ParseError> {
    let root: Node = serde_json::from_str(input).map_err(|e| ParseError::Json {
        message: e.to_string(),
        line: e.line() as u32,
        column: e.column() as u32,
    })?;
    // Structural errors have no source position once deserialized.
    root.validate().map_err(|source| ParseError::InvalidStructure { source, line: 0, column: 0 })?;
    log::debug!(target: "trellis_io", "read json tree with {} nodes", root.node_count());
    Ok(root)
}
