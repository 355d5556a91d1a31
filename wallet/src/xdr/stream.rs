//! Byte-level XDR streams.
//!
//! [`XdrWriter`] appends big-endian primitives and pads to four-byte
//! boundaries with zeros. [`XdrReader`] walks a borrowed slice, counts every
//! byte it consumes, and skips padding without looking at it.
//!
//! Lengths read off the wire are checked against the declared maximum and
//! against what is actually left in the buffer *before* anything is
//! allocated. A four-byte length prefix of `0xFFFFFFFF` should cost us an
//! error, not four gigabytes.

use super::XdrError;

/// Number of zero bytes needed to bring `len` to a four-byte boundary.
pub const fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only XDR output buffer.
#[derive(Debug, Default, Clone)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Booleans are an `int` holding exactly 0 or 1.
    pub fn write_bool(&mut self, value: bool) {
        self.write_i32(i32::from(value));
    }

    /// Raw bytes with no length prefix, padded to four bytes.
    pub fn write_fixed_opaque(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.pad();
    }

    /// Length-prefixed bytes, padded to four bytes.
    pub fn write_opaque(&mut self, bytes: &[u8], max: u32) -> Result<(), XdrError> {
        self.write_length(bytes.len(), max)?;
        self.write_fixed_opaque(bytes);
        Ok(())
    }

    /// Strings are opaque UTF-8. `max` counts bytes, not characters.
    pub fn write_string(&mut self, value: &str, max: u32) -> Result<(), XdrError> {
        self.write_opaque(value.as_bytes(), max)
    }

    /// Length prefix for a variable-size array or opaque.
    pub fn write_length(&mut self, len: usize, max: u32) -> Result<(), XdrError> {
        let length = u32::try_from(len)
            .ok()
            .filter(|length| *length <= max)
            .ok_or(XdrError::LengthExceeded {
                length: len as u64,
                max,
            })?;
        self.write_u32(length);
        Ok(())
    }

    /// Zero-fill up to the next four-byte boundary.
    pub fn pad(&mut self) {
        let padding = padding_for(self.buf.len());
        self.buf.resize(self.buf.len() + padding, 0);
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over an XDR byte slice.
#[derive(Debug, Clone)]
pub struct XdrReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> XdrReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far, padding included.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], XdrError> {
        if n > self.remaining() {
            return Err(XdrError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], XdrError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_i32(&mut self) -> Result<i32, XdrError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, XdrError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, XdrError> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, XdrError> {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    /// Any non-zero value reads as `true`.
    pub fn read_bool(&mut self) -> Result<bool, XdrError> {
        Ok(self.read_i32()? != 0)
    }

    /// `len` raw bytes followed by their padding.
    pub fn read_fixed_opaque(&mut self, len: usize) -> Result<&'a [u8], XdrError> {
        let bytes = self.take(len)?;
        self.skip_padding()?;
        Ok(bytes)
    }

    /// Length-prefixed bytes, at most `max` long.
    pub fn read_opaque(&mut self, max: u32) -> Result<&'a [u8], XdrError> {
        let len = self.read_length(max, 1)?;
        self.read_fixed_opaque(len)
    }

    pub fn read_string(&mut self, max: u32) -> Result<String, XdrError> {
        let bytes = self.read_opaque(max)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| XdrError::InvalidUtf8)
    }

    /// Read a length prefix and make sure `len` elements of at least
    /// `min_element_size` bytes each can possibly fit in what is left.
    pub fn read_length(&mut self, max: u32, min_element_size: usize) -> Result<usize, XdrError> {
        let length = self.read_u32()?;
        if length > max {
            return Err(XdrError::LengthExceeded {
                length: u64::from(length),
                max,
            });
        }
        let len = length as usize;
        let needed = len.saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(XdrError::UnexpectedEof {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(len)
    }

    /// Skip to the next four-byte boundary. Padding content is not checked.
    pub fn skip_padding(&mut self) -> Result<(), XdrError> {
        self.take(padding_for(self.pos)).map(|_| ())
    }

    /// Fail if anything is left unread.
    pub fn finish(self) -> Result<(), XdrError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(XdrError::TrailingBytes(n)),
        }
    }
}
