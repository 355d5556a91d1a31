//! The encoding half of the codec, plus base64 transport wrapping.
//!
//! Types write themselves through [`XdrEncode`]. Limits the schema declares
//! (`string<28>`, `Operation<100>`, …) are enforced here on the way out, so
//! an over-long memo fails loudly at encode time instead of being rejected
//! by a validator three hops away.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::stream::XdrWriter;
use super::XdrError;

/// A value with a canonical XDR encoding.
pub trait XdrEncode {
    /// Append the encoding of `self` to `writer`.
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError>;

    /// Encode into a fresh buffer.
    fn to_xdr(&self) -> Result<Vec<u8>, XdrError> {
        let mut writer = XdrWriter::new();
        self.encode(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Encode and wrap in standard padded base64.
    fn to_base64(&self) -> Result<String, XdrError> {
        Ok(encode_base64(&self.to_xdr()?))
    }
}

impl XdrEncode for i32 {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_i32(*self);
        Ok(())
    }
}

impl XdrEncode for u32 {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_u32(*self);
        Ok(())
    }
}

impl XdrEncode for i64 {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_i64(*self);
        Ok(())
    }
}

impl XdrEncode for u64 {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_u64(*self);
        Ok(())
    }
}

impl XdrEncode for bool {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_bool(*self);
        Ok(())
    }
}

/// Fixed-size opaque: no length prefix.
impl<const N: usize> XdrEncode for [u8; N] {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_fixed_opaque(self);
        Ok(())
    }
}

/// Optional values: a presence flag, then the value if there is one.
impl<T: XdrEncode> XdrEncode for Option<T> {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            Some(value) => {
                writer.write_bool(true);
                value.encode(writer)
            }
            None => {
                writer.write_bool(false);
                Ok(())
            }
        }
    }
}

/// Variable-size array `T<max>`.
pub fn encode_array<T: XdrEncode>(
    writer: &mut XdrWriter,
    items: &[T],
    max: u32,
) -> Result<(), XdrError> {
    writer.write_length(items.len(), max)?;
    items.iter().try_for_each(|item| item.encode(writer))
}

/// Standard alphabet, `=` padded.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>, XdrError> {
    Ok(STANDARD.decode(text)?)
}
