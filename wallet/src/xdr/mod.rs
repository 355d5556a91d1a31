//! # XDR Codec
//!
//! Everything the network stores or signs is XDR: big-endian, four-byte
//! aligned, no self-description whatsoever. If we emit one byte that differs
//! from what validators compute, every signature we produce is garbage. So
//! this module is deliberately small and deliberately strict.
//!
//! ## Architecture
//!
//! ```text
//! stream.rs     - XdrWriter / XdrReader: primitives, padding, bounds
//! codec.rs      - XdrEncode trait, base64 transport wrapping
//! schema.rs     - Static shape descriptors, the XdrValue tree, and the one
//!                 generic decoder every type goes through
//! types.rs      - Keys, memos, time bounds, signatures, transactions
//! operations.rs - Operation bodies (payment, manage balance)
//! ```
//!
//! ## Encoding vs decoding
//!
//! Encoding is direct: each type writes its own fields in declaration order.
//! Decoding is *not*. Every type publishes a static [`Shape`] describing its
//! fields, optionality and union arms, [`read_value`] walks that description
//! into an [`XdrValue`] tree, and the type only has to pick its fields back
//! out of the tree. Adding a record type means writing a descriptor, never
//! touching the decoder.

pub mod codec;
pub mod operations;
pub mod schema;
pub mod stream;
pub mod types;

use thiserror::Error;

pub use codec::{decode_base64, encode_base64, XdrEncode};
pub use operations::{
    FeeData, InvoiceReference, ManageBalanceAction, ManageBalanceOp, Operation, OperationBody,
    PaymentFeeData, PaymentOp,
};
pub use schema::{
    decode, read_value, write_value, Arm, EnumDescriptor, Field, FieldValues, FromXdrValue,
    RecordDescriptor, Shape, UnionDescriptor, XdrDecode, XdrValue,
};
pub use stream::{XdrReader, XdrWriter};
pub use types::{
    AccountId, BalanceId, DecoratedSignature, EmptyExt, Memo, PublicKey, TimeBounds,
    TransactionBody, TransactionEnvelope, TransactionExt,
};

/// Errors from encoding or decoding XDR.
///
/// Decoding errors are final. Corrupted bytes do not get better if you read
/// them again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XdrError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("length {length} exceeds the declared maximum of {max}")]
    LengthExceeded { length: u64, max: u32 },

    #[error("fixed-size opaque expects {expected} bytes, got {found}")]
    WrongFixedLength { expected: usize, found: usize },

    #[error("{value} is not a known value of enum {name}")]
    UnknownEnumValue { name: &'static str, value: i32 },

    #[error("union {union} has no arm for discriminant {value}")]
    UnknownDiscriminant { union: &'static str, value: i32 },

    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: &'static str, found: &'static str },

    #[error("{0} trailing bytes after the decoded value")]
    TrailingBytes(usize),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}
