//! Sequential big-endian reader over package bytes.
//!
//! # Usage
//!
//! ```
//! use rune_io::{ByteBuffer, StringTable};
//!
//! let table = StringTable::new(vec!["up".to_string(), "down".to_string()]);
//! let bytes = [0x00, 0x01, 0xFF, 0xFD];
//! let mut buffer = ByteBuffer::new(&bytes).with_string_table(table);
//!
//! assert_eq!(buffer.read_s().unwrap().as_deref(), Some("down"));
//! assert_eq!(buffer.read_s().unwrap().as_deref(), Some(""));
//! ```

use std::sync::Arc;

use parking_lot::RwLock;

use crate::color::format_color;
use crate::error::{BufferError, Result};

/// Shared-string reference meaning "no string".
const NULL_INDEX: u16 = 0xFFFF;
/// Alternate encoding of "no string" emitted by older tools.
const NULL_INDEX_ALT: u16 = 0xFFFE;
/// Shared-string reference meaning "present but empty".
const EMPTY_INDEX: u16 = 0xFFFD;

/// Package-wide pool of deduplicated strings.
///
/// Cloning shares the pool: nested buffers and back-patches through
/// [`ByteBuffer::write_s`] are visible to every holder.
#[derive(Debug, Clone, Default)]
pub struct StringTable(Arc<RwLock<Vec<String>>>);

impl StringTable {
    /// Create a table holding `strings`.
    pub fn new(strings: Vec<String>) -> Self {
        Self(Arc::new(RwLock::new(strings)))
    }

    /// Look up the string at `index`.
    pub fn get(&self, index: usize) -> Option<String> {
        self.0.read().get(index).cloned()
    }

    /// Replace the string at `index`. Returns `false` if out of range.
    pub fn set(&self, index: usize, value: String) -> bool {
        match self.0.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// True when both handles refer to the same pool.
    pub fn ptr_eq(&self, other: &StringTable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Big-endian cursor over an immutable byte span.
#[derive(Debug, Clone)]
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    position: usize,
    /// Format version of the package this buffer came from.
    pub version: u16,
    string_table: StringTable,
}

impl<'a> ByteBuffer<'a> {
    /// Create a cursor at offset 0 with an empty string table.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            version: 0,
            string_table: StringTable::default(),
        }
    }

    /// Attach a shared string table.
    pub fn with_string_table(mut self, table: StringTable) -> Self {
        self.string_table = table;
        self
    }

    /// Set the package format version.
    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn string_table(&self) -> &StringTable {
        &self.string_table
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor. Positions past the end are accepted; the next read fails.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end of the span.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Advance the cursor by `count` bytes without decoding them.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Borrow the next `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let data = self.data;
        let end = self
            .position
            .checked_add(count)
            .filter(|end| *end <= data.len())
            .ok_or(BufferError::Overrun {
                position: self.position,
                requested: count,
                len: data.len(),
            })?;
        let bytes = &data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    /// Read a byte as a boolean (`1` is true, anything else false).
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? == 1)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    /// Read a UTF-8 string prefixed by its `u16` byte length.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()?;
        self.read_string_len(usize::from(len))
    }

    /// Read `len` bytes as a UTF-8 string.
    pub fn read_string_len(&mut self, len: usize) -> Result<String> {
        let position = self.position;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| BufferError::InvalidUtf8 { position })
    }

    /// Read a shared-string reference.
    ///
    /// `0xFFFF` and `0xFFFE` decode to `None`, `0xFFFD` to an empty string.
    pub fn read_s(&mut self) -> Result<Option<String>> {
        let index = self.read_u16()?;
        match index {
            NULL_INDEX | NULL_INDEX_ALT => Ok(None),
            EMPTY_INDEX => Ok(Some(String::new())),
            _ => self
                .string_table
                .get(usize::from(index))
                .map(Some)
                .ok_or(BufferError::StringIndex {
                    index,
                    table_len: self.string_table.len(),
                }),
        }
    }

    /// Read `count` consecutive shared-string references.
    pub fn read_s_array(&mut self, count: usize) -> Result<Vec<Option<String>>> {
        (0..count).map(|_| self.read_s()).collect()
    }

    /// Read a shared-string reference and overwrite the slot it names.
    ///
    /// Sentinel references are consumed and ignored.
    pub fn write_s(&mut self, value: &str) -> Result<()> {
        let index = self.read_u16()?;
        if matches!(index, NULL_INDEX | NULL_INDEX_ALT | EMPTY_INDEX) {
            return Ok(());
        }
        if self.string_table.set(usize::from(index), value.to_owned()) {
            Ok(())
        } else {
            Err(BufferError::StringIndex {
                index,
                table_len: self.string_table.len(),
            })
        }
    }

    /// Read four bytes `r, g, b, a` as a packed `0xAARRGGBB` color.
    ///
    /// Without `has_alpha` the stored alpha byte is still consumed and the
    /// result is fully opaque.
    pub fn read_color(&mut self, has_alpha: bool) -> Result<u32> {
        let [r, g, b, a] = self.read_array::<4>()?;
        let a = if has_alpha { a } else { 0xFF };
        Ok(u32::from_be_bytes([a, r, g, b]))
    }

    /// Read a color and render it as a CSS hex string.
    pub fn read_color_s(&mut self, has_alpha: bool) -> Result<String> {
        Ok(format_color(self.read_color(has_alpha)?, has_alpha))
    }

    /// Read an `i32` length and return a sub-buffer over the next `length` bytes.
    ///
    /// The sub-buffer starts at its own offset 0 and shares this buffer's
    /// string table and version.
    pub fn read_buffer(&mut self) -> Result<ByteBuffer<'a>> {
        let position = self.position;
        let length = self.read_i32()?;
        let count =
            usize::try_from(length).map_err(|_| BufferError::NegativeLength { position, length })?;
        let data = self.read_bytes(count)?;
        Ok(ByteBuffer {
            data,
            position: 0,
            version: self.version,
            string_table: self.string_table.clone(),
        })
    }

    /// Jump to block `block_index` of the index table at `index_table_pos`.
    ///
    /// The table is a `u8` segment count, a `u8` address-width flag (`1` for
    /// 16-bit offsets, otherwise 32-bit), then one offset per segment relative
    /// to `index_table_pos`. Returns `Ok(false)` and leaves the cursor where it
    /// was when the block index is out of range or its offset is zero.
    pub fn seek(&mut self, index_table_pos: usize, block_index: usize) -> Result<bool> {
        let saved = self.position;
        self.position = index_table_pos;

        let segment_count = usize::from(self.read_u8()?);
        if block_index < segment_count {
            let use_short = self.read_u8()? == 1;
            let offset = if use_short {
                self.skip(2 * block_index)?;
                i32::from(self.read_i16()?)
            } else {
                self.skip(4 * block_index)?;
                self.read_i32()?
            };
            if let Ok(offset) = usize::try_from(offset)
                && offset > 0
            {
                self.position = index_table_pos + offset;
                return Ok(true);
            }
        }

        self.position = saved;
        Ok(false)
    }
}
