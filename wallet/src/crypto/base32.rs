//! # Secret-Aware Base-32
//!
//! RFC 4648 base-32, uppercase, no padding. The alphabet work is delegated
//! to `data-encoding`; what this module adds is buffer discipline. Both
//! directions write straight into pre-sized [`Zeroizing`] buffers, so when
//! the payload is a secret seed there is never an unzeroed copy of it lying
//! around the heap: no reallocation, no intermediate `String`, and the error
//! path drops (and wipes) whatever was partially decoded.
//!
//! Characters outside the alphabet are rejected, never skipped. A decoder
//! that silently drops stray characters will happily "validate" an address
//! with garbage glued to both ends.

use data_encoding::{DecodeKind, BASE32_NOPAD};
use thiserror::Error;
use zeroize::Zeroizing;

/// Why a base-32 string failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Base32Error {
    /// The length is not one an unpadded encoding can produce.
    #[error("invalid base-32 length: {0}")]
    InvalidLength(usize),

    /// A character outside `A-Z2-7`, or non-zero trailing bits.
    #[error("invalid base-32 character at position {0}")]
    InvalidCharacter(usize),
}

/// Encode `bytes` as unpadded uppercase base-32.
pub fn encode(bytes: &[u8]) -> Zeroizing<String> {
    let mut out = Zeroizing::new(String::with_capacity(BASE32_NOPAD.encode_len(bytes.len())));
    BASE32_NOPAD.encode_append(bytes, &mut out);
    out
}

/// Decode unpadded uppercase base-32.
pub fn decode(text: &str) -> Result<Zeroizing<Vec<u8>>, Base32Error> {
    let input = text.as_bytes();
    let len = BASE32_NOPAD
        .decode_len(input.len())
        .map_err(|_| Base32Error::InvalidLength(input.len()))?;

    let mut out = Zeroizing::new(vec![0u8; len]);
    match BASE32_NOPAD.decode_mut(input, &mut out) {
        Ok(written) => {
            out.truncate(written);
            Ok(out)
        }
        // `out` is wiped on drop, including any partially decoded prefix.
        Err(partial) => Err(match partial.error.kind {
            DecodeKind::Length | DecodeKind::Padding => Base32Error::InvalidLength(input.len()),
            DecodeKind::Symbol | DecodeKind::Trailing => {
                Base32Error::InvalidCharacter(partial.error.position)
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4648_vectors() {
        // Section 10 of RFC 4648, minus the padding.
        let cases = [
            ("", ""),
            ("f", "MY"),
            ("fo", "MZXQ"),
            ("foo", "MZXW6"),
            ("foob", "MZXW6YQ"),
            ("fooba", "MZXW6YTB"),
            ("foobar", "MZXW6YTBOI"),
        ];
        for (plain, encoded) in cases {
            assert_eq!(encode(plain.as_bytes()).as_str(), encoded);
            assert_eq!(decode(encoded).unwrap().as_slice(), plain.as_bytes());
        }
    }

    #[test]
    fn encode_does_not_over_allocate() {
        let out = encode(&[0xAB; 35]);
        assert_eq!(out.len(), 56);
        assert_eq!(out.capacity(), 56);
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        assert_eq!(decode("MZXW1YQ"), Err(Base32Error::InvalidCharacter(4)));
        assert_eq!(decode("mzxw6yq"), Err(Base32Error::InvalidCharacter(0)));
        assert!(decode(" MZXW6YQ").is_err());
        assert!(decode("MZXW6YQ=").is_err());
    }

    #[test]
    fn rejects_impossible_lengths() {
        assert_eq!(decode("M"), Err(Base32Error::InvalidLength(1)));
        assert_eq!(decode("MZX"), Err(Base32Error::InvalidLength(3)));
    }

    #[test]
    fn rejects_non_canonical_trailing_bits() {
        // "MY" decodes to 'f'; "MZ" sets bits past the last full byte.
        assert!(decode("MY").is_ok());
        assert!(matches!(decode("MZ"), Err(Base32Error::InvalidCharacter(_))));
    }
}
