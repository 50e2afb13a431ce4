//! Core types for the Trellis UI engine.
//!
//! This crate provides the foundational types shared by every pipeline stage:
//! - The component tree ([`Node`]) and its construction [`Session`]
//! - Style properties, values, and blocks
//! - Value types (lengths, colors, alignment keywords)
//! - Error types

pub mod errors;
pub mod node;
pub mod style;
pub mod types;

pub use errors::*;
pub use node::*;
pub use style::*;
pub use types::*;
