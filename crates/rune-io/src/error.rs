//! Error types for binary buffer decoding.

use thiserror::Error;

/// Result type for buffer reads.
pub type Result<T> = std::result::Result<T, BufferError>;

/// Errors raised while decoding a package buffer.
///
/// Every variant means the upstream data is corrupt. Callers abort the load
/// that produced it instead of attempting partial recovery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A read would run past the end of the byte span.
    #[error("read of {requested} bytes at offset {position} overruns buffer of {len} bytes")]
    Overrun {
        position: usize,
        requested: usize,
        len: usize,
    },

    /// A length prefix was negative.
    #[error("negative length {length} at offset {position}")]
    NegativeLength { position: usize, length: i32 },

    /// String bytes were not valid UTF-8.
    #[error("invalid UTF-8 string at offset {position}")]
    InvalidUtf8 { position: usize },

    /// A shared-string reference points outside the string table.
    #[error("string index {index} out of range for table of {table_len} entries")]
    StringIndex { index: u16, table_len: usize },
}
