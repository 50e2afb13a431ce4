//! Style resolution for Trellis component trees.
//!
//! Resolution is a single top-down pass. Precedence, lowest first:
//! 1. **Kind defaults**: direction for rows and columns, padding for buttons
//! 2. **Inheritance**: color and font properties from the parent
//! 3. **Explicit**: the node's own style block
//!
//! # Example
//!
//! ```ignore
//! use trellis_style::resolve;
//!
//! let resolved = resolve(&tree);
//! for node in resolved.iter() {
//!     println!("{}: {:?}", node.node.id(), node.style.color);
//! }
//! ```

mod resolved;
mod resolver;

pub use resolved::{Edges, ResolvedNode, ResolvedStyle, ResolvedStyleTree};
pub use resolver::{kind_defaults, resolve};
