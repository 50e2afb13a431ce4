//! Compact binary interchange format.
//!
//! Layout (little-endian):
//!
//! ```text
//! header   "TRLB" major:u16 minor:u16 flags:u16 strings:u32 styles:u32 nodes:u32
//! strings  (len:u32 utf8)*
//! styles   (entries:u16 (property:u8 value)*)*
//! nodes    (kind:u8 id:u32 children:u32 style:u32 payload rect)*   pre-order
//! ```
//!
//! Strings and style blocks are deduplicated; nodes refer to them by index.

mod reader;
mod writer;

pub use reader::decode;
pub use writer::encode;

pub const MAGIC: &[u8; 4] = b"TRLB";

/// Version written by [`encode`]. Readers reject any other major.
pub const FORMAT_VERSION: (u16, u16) = (1, 0);

/// Style index of a node without a style block.
pub const NO_STYLE: u32 = u32::MAX;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 4 + 2 + 2 + 2 + 4 + 4 + 4;

// Length subtags
const LENGTH_FIXED: u8 = 0;
const LENGTH_PERCENT: u8 = 1;
const LENGTH_AUTO: u8 = 2;
