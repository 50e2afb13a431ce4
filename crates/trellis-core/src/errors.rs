//! Error types for the Trellis engine.

use crate::node::{NodeId, NodeKind};
use crate::style::ValueKind;
use thiserror::Error;

/// Top-level error type for the Trellis engine.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Errors while reading the text interchange format.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at line {line}, column {column}: expected {expected}, found {found:?}")]
    UnexpectedToken {
        found: String,
        expected: String,
        line: u32,
        column: u32,
    },

    #[error("Invalid header at line {line}, column {column}: {found:?}")]
    InvalidHeader { found: String, line: u32, column: u32 },

    #[error("Unsupported document version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16, line: u32, column: u32 },

    #[error("Unknown property {name:?} at line {line}, column {column}")]
    UnknownProperty { name: String, line: u32, column: u32 },

    #[error("Unknown node kind {name:?} at line {line}, column {column}")]
    UnknownNodeKind { name: String, line: u32, column: u32 },

    #[error("Invalid value {value:?} for {property} at line {line}, column {column}")]
    InvalidValue {
        property: String,
        value: String,
        line: u32,
        column: u32,
    },

    #[error("Unterminated string starting at line {line}, column {column}")]
    UnterminatedString { line: u32, column: u32 },

    #[error("Block opened at line {line}, column {column} is never closed")]
    UnterminatedBlock { line: u32, column: u32 },

    #[error("Duplicate node id {id} at line {line}, column {column}")]
    DuplicateId { id: u32, line: u32, column: u32 },

    #[error("Invalid structure at line {line}, column {column}: {source}")]
    InvalidStructure {
        source: ConstructionError,
        line: u32,
        column: u32,
    },

    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Invalid JSON document: {message}")]
    Json { message: String, line: u32, column: u32 },
}

impl ParseError {
    /// The 1-based line and column of the error, where one is known.
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            ParseError::UnexpectedToken { line, column, .. }
            | ParseError::InvalidHeader { line, column, .. }
            | ParseError::UnsupportedVersion { line, column, .. }
            | ParseError::UnknownProperty { line, column, .. }
            | ParseError::UnknownNodeKind { line, column, .. }
            | ParseError::InvalidValue { line, column, .. }
            | ParseError::UnterminatedString { line, column }
            | ParseError::UnterminatedBlock { line, column }
            | ParseError::DuplicateId { line, column, .. }
            | ParseError::InvalidStructure { line, column, .. }
            | ParseError::Json { line, column, .. } => Some((*line, *column)),
            ParseError::UnexpectedEof => None,
        }
    }
}

/// Errors while reading the binary interchange format.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("Bad magic bytes: {found:?}")]
    BadMagic { found: Vec<u8> },

    #[error("Unsupported format version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("Truncated input at offset {offset}: {context}")]
    Truncated { offset: usize, context: &'static str },

    #[error("{table} index {index} out of range (table has {len} entries) at offset {offset}")]
    IndexOutOfRange {
        table: &'static str,
        index: u32,
        len: usize,
        offset: usize,
    },

    #[error("Invalid {what} tag {tag} at offset {offset}")]
    InvalidTag { what: &'static str, tag: u8, offset: usize },

    #[error("Invalid UTF-8 in string table entry {index}")]
    InvalidUtf8 { index: usize },

    #[error("{count} trailing bytes after node table")]
    TrailingBytes { count: usize },

    #[error("Node table ended with {open} unfinished parents")]
    CountMismatch { open: usize },

    #[error("Node record {index} follows a completed root")]
    DetachedNode { index: u32 },

    #[error("Node table is empty")]
    EmptyTree,

    #[error("Duplicate node id {id}")]
    DuplicateId { id: u32 },

    #[error("No handler registered for format {name:?}")]
    UnknownFormat { name: String },

    #[error("Invalid style table entry {index}: {source}")]
    InvalidStyle { index: usize, source: ConstructionError },

    #[error("Invalid structure at node {id}: {source}")]
    InvalidStructure { id: u32, source: ConstructionError },

    #[error("Could not encode tree: {message}")]
    Encode { message: String },
}

/// Errors from building or mutating a component tree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("{kind:?} nodes cannot have children")]
    LeafCannotHaveChildren { kind: NodeKind },

    #[error("{kind:?} nodes accept at most {max} children")]
    TooManyChildren { kind: NodeKind, max: usize },

    #[error("Payload does not match node kind {kind:?}")]
    PayloadMismatch { kind: NodeKind },

    #[error("Property {property} expects a {expected:?} value, found {found:?}")]
    ValueMismatch {
        property: &'static str,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Property {property} requires a finite value")]
    NonFiniteValue { property: &'static str },

    #[error("Payload of {kind:?} contains a non-finite number")]
    NonFinitePayload { kind: NodeKind },

    #[error("Duplicate node id {id}")]
    DuplicateId { id: NodeId },
}
