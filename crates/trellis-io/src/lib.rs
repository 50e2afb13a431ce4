//! trellis-io: interchange formats for Trellis component trees.
//!
//! Every codec round-trips exactly: ids, kinds, child order, style values
//! (bit-exact), payloads, and computed rects.
//!
//! | Format | Read | Write | Notes |
//! |--------|------|-------|-------|
//! | Text (`.trellis`) | Yes | Yes | Human-readable, line/column errors |
//! | Binary (`.trlb`) | Yes | Yes | Deduplicated strings and styles |
//! | JSON (`.json`) | Yes | Yes | `json` feature, serde-based |
//!
//! # Quick Start
//!
//! ```ignore
//! use trellis_io::{read_any, write_binary, Format};
//!
//! let bytes = write_binary(&tree);
//! let restored = read_any(&bytes)?;
//!
//! let format = Format::from_extension("trellis").unwrap();
//! let text = format.write(&tree)?;
//! ```

pub mod binary;
#[cfg(feature = "json")]
mod json;
pub mod text;

use std::collections::HashMap;

use trellis_core::{FormatError, Node, NodeId, ParseError, Rect, TrellisError};

#[cfg(feature = "json")]
pub use json::{read_json, write_json, MAX_JSON_DEPTH};
pub use text::{TextDocument, TextOptions};

/// The built-in interchange formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Text,
    Binary,
    Json,
}

impl Format {
    /// Every built-in format, including JSON when the feature is off.
    pub const ALL: [Format; 3] = [Format::Text, Format::Binary, Format::Json];

    pub fn name(self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Binary => "binary",
            Format::Json => "json",
        }
    }

    /// File extensions without the dot. The first is the one writers use.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Text => &["trellis", "trl"],
            Format::Binary => &["trlb"],
            Format::Json => &["json"],
        }
    }

    /// Look up a format by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Format> {
        Self::ALL.into_iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Look up a format by file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Format> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Read a tree stored in this format.
    pub fn read(self, data: &[u8]) -> Result<Node, TrellisError> {
        match self {
            Format::Text => Ok(read_text(utf8(data)?)?),
            Format::Binary => Ok(read_binary(data)?),
            #[cfg(feature = "json")]
            Format::Json => Ok(read_json(utf8(data)?)?),
            #[cfg(not(feature = "json"))]
            Format::Json => Err(self.unavailable()),
        }
    }

    /// Write a tree in this format. Text uses default options.
    pub fn write(self, root: &Node) -> Result<Vec<u8>, TrellisError> {
        match self {
            Format::Text => Ok(write_text(root).into_bytes()),
            Format::Binary => Ok(write_binary(root)),
            #[cfg(feature = "json")]
            Format::Json => Ok(write_json(root)?.into_bytes()),
            #[cfg(not(feature = "json"))]
            Format::Json => Err(self.unavailable()),
        }
    }

    #[cfg(not(feature = "json"))]
    fn unavailable(self) -> TrellisError {
        FormatError::UnknownFormat { name: self.name().to_string() }.into()
    }
}

/// Serialize `root` as text with default options.
pub fn write_text(root: &Node) -> String {
    write_text_with(root, &TextOptions::default())
}

pub fn write_text_with(root: &Node, options: &TextOptions) -> String {
    text::write_document(root, options)
}

/// Parse a text document, discarding its metadata.
pub fn read_text(input: &str) -> Result<Node, ParseError> {
    text::parse_document(input).map(|doc| doc.root)
}

/// Parse a text document with its `@meta` entries.
pub fn parse_text(input: &str) -> Result<TextDocument, ParseError> {
    text::parse_document(input)
}

pub fn write_binary(root: &Node) -> Vec<u8> {
    binary::encode(root)
}

pub fn read_binary(data: &[u8]) -> Result<Node, FormatError> {
    binary::decode(data)
}

/// Guess the format from the leading bytes.
///
/// Binary is recognized by its magic, JSON by a leading `{`, and text by
/// its header keyword after any whitespace and `//` comment lines.
pub fn detect_format(data: &[u8]) -> Option<Format> {
    if data.starts_with(binary::MAGIC) {
        return Some(Format::Binary);
    }

    let mut rest = data;
    loop {
        rest = trim_ascii_start(rest);
        if rest.starts_with(b"//") {
            let end = rest.iter().position(|b| *b == b'\n').unwrap_or(rest.len());
            rest = &rest[end..];
        } else {
            break;
        }
    }

    if rest.starts_with(b"{") {
        Some(Format::Json)
    } else if rest.starts_with(text::HEADER_KEYWORD.as_bytes()) {
        Some(Format::Text)
    } else {
        None
    }
}

/// Read a tree in whichever built-in format `data` is in.
pub fn read_any(data: &[u8]) -> Result<Node, TrellisError> {
    match detect_format(data) {
        Some(format) => format.read(data),
        None => Err(FormatError::BadMagic { found: data.iter().take(binary::MAGIC.len()).copied().collect() }.into()),
    }
}

pub(crate) fn utf8(data: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(data).map_err(|e| {
        // Position of the first bad byte.
        let valid = &data[..e.valid_up_to()];
        let line = valid.iter().filter(|b| **b == b'\n').count() as u32 + 1;
        let column = valid.iter().rev().take_while(|b| **b != b'\n').count() as u32 + 1;
        ParseError::InvalidHeader { found: "invalid UTF-8".to_string(), line, column }
    })
}

fn trim_ascii_start(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if first.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    bytes
}

/// Attach decoded rects once the tree is assembled. Attaching a child
/// clears its rect and the parent's, so readers apply them last.
pub(crate) fn apply_rects(root: &mut Node, rects: &HashMap<NodeId, Rect>) {
    if rects.is_empty() {
        return;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(rect) = rects.get(&node.id()) {
            node.set_computed_rect(Some(*rect));
        }
        stack.extend(node.children_mut().iter_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Session;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(b"TRLB\x01\x00"), Some(Format::Binary));
        assert_eq!(detect_format(b"  \n{\"kind\": \"Row\"}"), Some(Format::Json));
        assert_eq!(detect_format(b"// exported\ntrellis 1.0\n"), Some(Format::Text));
        assert_eq!(detect_format(b"<svg/>"), None);
        assert_eq!(detect_format(b""), None);
    }

    #[test]
    fn test_read_any_dispatches() {
        let mut s = Session::new();
        let tree = s.center().with_child(s.button("go")).unwrap();
        assert_eq!(read_any(&write_binary(&tree)).unwrap(), tree);
        assert_eq!(read_any(write_text(&tree).as_bytes()).unwrap(), tree);
        assert!(matches!(read_any(b"nope"), Err(TrellisError::Format(FormatError::BadMagic { .. }))));
    }

    #[test]
    fn test_invalid_utf8_text() {
        let err = read_any(b"trellis 1.0\nText #1 = \"\xff\";").unwrap_err();
        assert!(matches!(err, TrellisError::Parse(ParseError::InvalidHeader { line: 2, column: 12, .. })));
    }

    #[test]
    fn test_rects_survive_reading() {
        let mut s = Session::new();
        let mut tree = s.column().with_child(s.text("a")).unwrap();
        tree.set_computed_rect(Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        tree.children_mut()[0].set_computed_rect(Some(Rect::new(0.0, 0.0, 10.0, 20.0)));

        let restored = read_text(&write_text(&tree)).unwrap();
        assert_eq!(restored, tree);
        let restored = read_binary(&write_binary(&tree)).unwrap();
        assert_eq!(restored.children()[0].computed_rect(), Some(Rect::new(0.0, 0.0, 10.0, 20.0)));
    }

    #[test]
    fn test_format_lookup() {
        assert_eq!(Format::from_extension(".trl"), Some(Format::Text));
        assert_eq!(Format::from_extension("TRLB"), Some(Format::Binary));
        assert_eq!(Format::from_extension("json"), Some(Format::Json));
        assert_eq!(Format::from_extension("svg"), None);
        assert_eq!(Format::from_name("Binary"), Some(Format::Binary));
        assert_eq!(Format::from_name("yaml"), None);
        for format in Format::ALL {
            assert_eq!(Format::from_extension(format.extensions()[0]), Some(format));
        }
    }

    #[test]
    fn test_format_write_then_detect() {
        let mut s = Session::new();
        let tree = s.column().with_child(s.text("hi")).unwrap();
        for format in [Format::Text, Format::Binary] {
            let bytes = format.write(&tree).unwrap();
            assert_eq!(detect_format(&bytes), Some(format));
            assert_eq!(format.read(&bytes).unwrap(), tree);
            assert_eq!(read_any(&bytes).unwrap(), tree);
        }
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_format() {
        let mut s = Session::new();
        let tree = s.row().with_child(s.image("a.png", 4.0, 3.0).unwrap()).unwrap();
        let bytes = Format::Json.write(&tree).unwrap();
        assert_eq!(detect_format(&bytes), Some(Format::Json));
        assert_eq!(Format::Json.read(&bytes).unwrap(), tree);
    }

    #[test]
    fn test_format_read_reports_codec_errors() {
        assert!(matches!(Format::Binary.read(b"GIF89a"), Err(TrellisError::Format(FormatError::BadMagic { .. }))));
        assert!(matches!(Format::Text.read(b"trellis 9.0\n"), Err(TrellisError::Parse(_))));
    }
}
