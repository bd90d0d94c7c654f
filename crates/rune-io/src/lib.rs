//! Binary decoding primitives for Rune packages.
//!
//! [`ByteBuffer`] is a sequential big-endian cursor over an immutable byte
//! span. Strings that repeat across a package live in a shared
//! [`StringTable`] and are referenced by 16-bit index.

mod buffer;
mod color;
mod error;

pub use buffer::{ByteBuffer, StringTable};
pub use color::{format_color, parse_color};
pub use error::{BufferError, Result};
