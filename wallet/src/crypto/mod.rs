//! # Cryptographic Primitives
//!
//! The wire format leans on three boring primitives: SHA-256 for network ids
//! and transaction hashes, CRC16/XMODEM for address checksums, and base-32
//! for turning bytes into something a human can paste. Ed25519 itself is
//! consumed directly from `ed25519-dalek` by [`crate::account`].
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin wrapper around `sha2`, `crc` and
//! `data-encoding`. The only thing we add is the discipline of keeping
//! secret-bearing buffers in `Zeroizing` so they get wiped on the way out.

pub mod base32;
pub mod checksum;
pub mod hash;

pub use base32::Base32Error;
pub use checksum::{checksum, verify_checksum, CHECKSUM_LENGTH};
pub use hash::{sha256, sha256_concat};
