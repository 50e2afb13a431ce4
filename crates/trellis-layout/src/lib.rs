//! Layout computation for Trellis component trees.
//!
//! This crate turns a resolved style tree into absolute rectangles.
//!
//! # Architecture
//!
//! 1. **Intrinsic sizing**: bottom-up content sizes, using the host's text measurement
//! 2. **Flex distribution**: top-down sizing and placement along main and cross axes
//! 3. **Numeric domains**: the same algorithm runs on `f64` or 16.16 fixed point
//!
//! # Example
//!
//! ```ignore
//! use trellis_layout::{layout, AvailableSize, EstimatedTextMeasure, LayoutOptions};
//!
//! let resolved = trellis_style::resolve(&tree);
//! let laid_out = layout(&resolved, AvailableSize::new(800.0, 600.0), &EstimatedTextMeasure::default(), &LayoutOptions::default());
//!
//! for (id, rect) in laid_out.iter() {
//!     println!("{}: {:?}", id, rect);
//! }
//! ```

mod compute;
mod flex;
mod measure;
mod scalar;
mod tree;

pub use compute::{layout, AvailableSize, LayoutOptions, NumericDomain};
pub use measure::{EstimatedTextMeasure, FontProperties, TextMeasure, TextSize};
pub use scalar::{Fixed, LayoutScalar, FRACTIONAL_BITS};
pub use tree::LaidOutTree;
