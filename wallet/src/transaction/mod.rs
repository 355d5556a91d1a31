//! # Transaction Module
//!
//! Building, hashing, signing and (de)serializing TokenD transactions.
//!
//! ## Architecture
//!
//! ```text
//! builder.rs  - TransactionBuilder and the immutable Transaction it produces
//! signing.rs  - Signature base, transaction hash, decorated signatures
//! salt.rs     - Where default salts come from (OS RNG or a fixed value)
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: collect operations and options on a [`TransactionBuilder`],
//!    then `build()`. Validation happens here and nowhere else.
//! 2. **Sign**: signers passed to the builder sign during `build()`; more
//!    can be appended later with [`Transaction::add_signature`].
//! 3. **Ship**: [`Transaction::to_base64`] yields the envelope the network
//!    accepts.
//!
//! Going the other way, [`Transaction::from_base64`] decodes an envelope
//! received from someone else so it can be inspected or co-signed.
//!
//! ## Design Decisions
//!
//! - The hash is SHA-256 over `network_id || ENVELOPE_TYPE_TX || XDR(body)`.
//!   Signatures are not part of it, so signers can sign in any order.
//! - The salt is stored as an absolute value. `i64::MIN` has no positive
//!   counterpart and is refused instead of silently wrapping.
//! - Default time bounds are `[0, now + 601200]`, where `now` already
//!   includes the network clock offset.

pub mod builder;
pub mod salt;
pub mod signing;

use thiserror::Error;

use crate::account::AccountError;
use crate::strkey::FormatError;
use crate::xdr::XdrError;

pub use builder::{Transaction, TransactionBuilder};
pub use salt::{FixedSalt, OsSaltSource, SaltSource};
pub use signing::{sign_hash, signature_base, transaction_hash, verify_decorated};

/// Errors from building, signing or decoding a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("transaction must contain at least one operation")]
    NoOperations,

    #[error("transaction has {count} operations, at most {max} are allowed")]
    TooManyOperations { count: usize, max: u32 },

    #[error("transaction already carries the maximum of {max} signatures")]
    TooManySignatures { max: u32 },

    #[error("salt i64::MIN has no absolute value")]
    ReservedSalt,

    #[error("memo text is {length} bytes, at most {max} are allowed")]
    MemoTooLong { length: usize, max: u32 },

    #[error("signing failed: {0}")]
    Signing(#[from] AccountError),

    #[error("invalid source account: {0}")]
    InvalidSourceAccount(#[source] FormatError),

    #[error("xdr: {0}")]
    Xdr(#[from] XdrError),
}
