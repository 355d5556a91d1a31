//! # Checksummed Text Addresses
//!
//! Every key, balance and hash a human ever sees is a "strkey": one version
//! byte saying what kind of thing it is, the 32 raw bytes, a CRC16/XMODEM
//! checksum over both, all of it base-32 encoded. The version byte is chosen
//! so the first character of the text is a readable prefix:
//!
//! | Kind          | Byte   | Prefix |
//! |---------------|--------|--------|
//! | Account id    | `0x30` | `G`    |
//! | Secret seed   | `0x90` | `S`    |
//! | Balance id    | `0x08` | `B`    |
//! | Pre-auth tx   | `0x98` | `T`    |
//! | SHA-256 hash  | `0xB8` | `X`    |
//!
//! ## Secrets
//!
//! Seeds go through exactly the same code as everything else, which means
//! every buffer along the way has to be treated as if it held a seed. They
//! all live in [`Zeroizing`] wrappers: the payload before the checksum is
//! appended, the base-32 text, the decoded bytes, and the error path too.
//! Decoding failures never hand back partially decoded bytes.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

use crate::crypto::base32::{self, Base32Error};
use crate::crypto::checksum::{checksum, verify_checksum, CHECKSUM_LENGTH};

// ---------------------------------------------------------------------------
// Version bytes
// ---------------------------------------------------------------------------

/// The kind of payload a strkey carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionByte {
    AccountId,
    Seed,
    BalanceId,
    PreAuthTx,
    Sha256Hash,
}

impl VersionByte {
    /// Every known kind, in tag order.
    pub const ALL: [VersionByte; 5] = [
        VersionByte::BalanceId,
        VersionByte::AccountId,
        VersionByte::Seed,
        VersionByte::PreAuthTx,
        VersionByte::Sha256Hash,
    ];

    /// The tag byte. The top five bits select the leading base-32 character.
    pub const fn byte(self) -> u8 {
        match self {
            VersionByte::AccountId => 6 << 3,
            VersionByte::Seed => 18 << 3,
            VersionByte::BalanceId => 1 << 3,
            VersionByte::PreAuthTx => 19 << 3,
            VersionByte::Sha256Hash => 23 << 3,
        }
    }

    /// Look a tag byte up in the known set.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.byte() == byte)
    }

    /// The character every encoding of this kind starts with.
    pub const fn prefix(self) -> char {
        match self {
            VersionByte::AccountId => 'G',
            VersionByte::Seed => 'S',
            VersionByte::BalanceId => 'B',
            VersionByte::PreAuthTx => 'T',
            VersionByte::Sha256Hash => 'X',
        }
    }

    /// Raw payload length. All current kinds carry 32 bytes.
    pub const fn payload_length(self) -> usize {
        32
    }

    /// Whether the payload is secret key material.
    pub const fn is_secret(self) -> bool {
        matches!(self, VersionByte::Seed)
    }

    const fn encoded_length(self) -> usize {
        1 + self.payload_length() + CHECKSUM_LENGTH
    }
}

impl fmt::Display for VersionByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionByte::AccountId => "account id",
            VersionByte::Seed => "secret seed",
            VersionByte::BalanceId => "balance id",
            VersionByte::PreAuthTx => "pre-auth tx",
            VersionByte::Sha256Hash => "sha256 hash",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a strkey was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    InvalidLength,
    InvalidCharacter,
    InvalidChecksum,
    /// Known tag, but not the one the caller asked for.
    InvalidVersionByte,
    /// Tag outside the known set.
    UnknownVersionByte,
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            FormatErrorKind::InvalidLength => "invalid length",
            FormatErrorKind::InvalidCharacter => "invalid character",
            FormatErrorKind::InvalidChecksum => "checksum mismatch",
            FormatErrorKind::InvalidVersionByte => "unexpected version byte",
            FormatErrorKind::UnknownVersionByte => "unknown version byte",
        };
        f.write_str(reason)
    }
}

/// A strkey failed to decode.
///
/// There is one error type on purpose: callers should reject the input, not
/// branch on the cause. The `reason` is there for logs and tests. It never
/// carries any of the decoded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid strkey format: {reason}")]
pub struct FormatError {
    pub reason: FormatErrorKind,
}

impl FormatError {
    pub const fn new(reason: FormatErrorKind) -> Self {
        Self { reason }
    }
}

impl From<Base32Error> for FormatError {
    fn from(err: Base32Error) -> Self {
        match err {
            Base32Error::InvalidLength(_) => FormatError::new(FormatErrorKind::InvalidLength),
            Base32Error::InvalidCharacter(_) => FormatError::new(FormatErrorKind::InvalidCharacter),
        }
    }
}

// ---------------------------------------------------------------------------
// Generic encode / decode
// ---------------------------------------------------------------------------

/// Encode `data` under `version`.
///
/// The result is wrapped in [`Zeroizing`] because for seeds the text *is*
/// the secret. Callers encoding public data can take the `String` out.
pub fn encode_check(version: VersionByte, data: &[u8]) -> Zeroizing<String> {
    let mut payload = Zeroizing::new(Vec::with_capacity(1 + data.len() + CHECKSUM_LENGTH));
    payload.push(version.byte());
    payload.extend_from_slice(data);
    let sum = checksum(&payload);
    payload.extend_from_slice(&sum);
    base32::encode(&payload)
}

/// Decode `text`, requiring it to carry `expected`.
///
/// The checksum is checked before the version byte, so a corrupted address
/// always reports [`FormatErrorKind::InvalidChecksum`].
pub fn decode_check(expected: VersionByte, text: &str) -> Result<Zeroizing<Vec<u8>>, FormatError> {
    let (version, data) = decode_any(text)?;
    if version != expected {
        return Err(FormatError::new(FormatErrorKind::InvalidVersionByte));
    }
    Ok(data)
}

/// Decode `text` under whichever known version byte it carries.
pub fn decode_any(text: &str) -> Result<(VersionByte, Zeroizing<Vec<u8>>), FormatError> {
    let raw = base32::decode(text)?;
    if raw.len() < 1 + CHECKSUM_LENGTH {
        return Err(FormatError::new(FormatErrorKind::InvalidLength));
    }

    let (body, sum) = raw.split_at(raw.len() - CHECKSUM_LENGTH);
    if !verify_checksum(body, sum) {
        return Err(FormatError::new(FormatErrorKind::InvalidChecksum));
    }

    let version = VersionByte::from_byte(body[0])
        .ok_or(FormatError::new(FormatErrorKind::UnknownVersionByte))?;
    if raw.len() != version.encoded_length() {
        return Err(FormatError::new(FormatErrorKind::InvalidLength));
    }

    Ok((version, Zeroizing::new(body[1..].to_vec())))
}

/// `true` iff `text` decodes under `version`. Never panics.
pub fn is_valid(version: VersionByte, text: &str) -> bool {
    decode_check(version, text).is_ok()
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

fn public_string(version: VersionByte, data: &[u8; 32]) -> String {
    let mut encoded = encode_check(version, data);
    std::mem::take(&mut *encoded)
}

fn public_array(version: VersionByte, text: &str) -> Result<[u8; 32], FormatError> {
    let data = decode_check(version, text)?;
    <[u8; 32]>::try_from(data.as_slice())
        .map_err(|_| FormatError::new(FormatErrorKind::InvalidLength))
}

/// `G…` text for a raw Ed25519 public key.
pub fn encode_account_id(public_key: &[u8; 32]) -> String {
    public_string(VersionByte::AccountId, public_key)
}

pub fn decode_account_id(text: &str) -> Result<[u8; 32], FormatError> {
    public_array(VersionByte::AccountId, text)
}

/// `S…` text for a raw Ed25519 seed.
pub fn encode_secret_seed(seed: &[u8; 32]) -> Zeroizing<String> {
    encode_check(VersionByte::Seed, seed)
}

pub fn decode_secret_seed(text: &str) -> Result<Zeroizing<[u8; 32]>, FormatError> {
    let data = decode_check(VersionByte::Seed, text)?;
    if data.len() != 32 {
        return Err(FormatError::new(FormatErrorKind::InvalidLength));
    }
    let mut seed = Zeroizing::new([0u8; 32]);
    seed.copy_from_slice(&data);
    Ok(seed)
}

pub fn encode_balance_id(balance: &[u8; 32]) -> String {
    public_string(VersionByte::BalanceId, balance)
}

pub fn decode_balance_id(text: &str) -> Result<[u8; 32], FormatError> {
    public_array(VersionByte::BalanceId, text)
}

pub fn encode_pre_auth_tx(hash: &[u8; 32]) -> String {
    public_string(VersionByte::PreAuthTx, hash)
}

pub fn decode_pre_auth_tx(text: &str) -> Result<[u8; 32], FormatError> {
    public_array(VersionByte::PreAuthTx, text)
}

pub fn encode_sha256_hash(hash: &[u8; 32]) -> String {
    public_string(VersionByte::Sha256Hash, hash)
}

pub fn decode_sha256_hash(text: &str) -> Result<[u8; 32], FormatError> {
    public_array(VersionByte::Sha256Hash, text)
}
