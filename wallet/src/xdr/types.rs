//! Core ledger types: keys, memos, time bounds, extensions, signatures,
//! transactions and envelopes.
//!
//! Each type comes in three parts: the Rust type, its [`XdrEncode`] impl
//! (fields in declaration order), and a static descriptor plus
//! [`FromXdrValue`] impl for the generic decoder. Keep the three in sync; the
//! round-trip tests at the bottom will tell you when they are not.

use std::fmt;

use crate::config::{MAX_MEMO_TEXT_LENGTH, MAX_OPERATIONS, MAX_SIGNATURES, MAX_SIGNATURE_LENGTH};
use crate::strkey::{self, FormatError};

use super::codec::{encode_array, XdrEncode};
use super::operations::{Operation, OPERATION};
use super::schema::{
    Arm, EnumDescriptor, Field, FromXdrValue, RecordDescriptor, Shape, UnionDescriptor,
    XdrDecode, XdrValue, UINT64,
};
use super::stream::XdrWriter;
use super::XdrError;

pub(crate) static HASH: Shape = Shape::FixedOpaque(32);

fn unknown_arm(union: &'static str, value: i32) -> XdrError {
    XdrError::UnknownDiscriminant { union, value }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

static CRYPTO_KEY_TYPE_ENUM: EnumDescriptor = EnumDescriptor {
    name: "CryptoKeyType",
    values: &[("KEY_TYPE_ED25519", 0)],
};
static CRYPTO_KEY_TYPE: Shape = Shape::Enum(&CRYPTO_KEY_TYPE_ENUM);
static PUBLIC_KEY_ED25519: [Field; 1] = [Field::required("ed25519", &HASH)];
static PUBLIC_KEY_ARMS: [Arm; 1] = [Arm {
    value: 0,
    name: "KEY_TYPE_ED25519",
    fields: &PUBLIC_KEY_ED25519,
}];
static PUBLIC_KEY_UNION: UnionDescriptor = UnionDescriptor {
    name: "PublicKey",
    discriminant: &CRYPTO_KEY_TYPE,
    arms: &PUBLIC_KEY_ARMS,
};
pub static PUBLIC_KEY: Shape = Shape::Union(&PUBLIC_KEY_UNION);

/// An Ed25519 public key as the ledger sees it.
///
/// Account ids and balance ids are both `PublicKey`s on the wire; only their
/// text form differs (`G…` vs `B…`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKey {
    Ed25519([u8; 32]),
}

pub type AccountId = PublicKey;
pub type BalanceId = PublicKey;

impl PublicKey {
    /// Parse a `G…` account id.
    pub fn from_account_id(text: &str) -> Result<Self, FormatError> {
        strkey::decode_account_id(text).map(PublicKey::Ed25519)
    }

    /// Parse a `B…` balance id.
    pub fn from_balance_id(text: &str) -> Result<Self, FormatError> {
        strkey::decode_balance_id(text).map(PublicKey::Ed25519)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        match self {
            PublicKey::Ed25519(bytes) => bytes,
        }
    }

    pub fn to_account_id(&self) -> String {
        strkey::encode_account_id(self.as_bytes())
    }

    pub fn to_balance_id(&self) -> String {
        strkey::encode_balance_id(self.as_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_account_id())
    }
}

impl XdrEncode for PublicKey {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            PublicKey::Ed25519(bytes) => {
                writer.write_i32(0);
                writer.write_fixed_opaque(bytes);
            }
        }
        Ok(())
    }
}

impl FromXdrValue for PublicKey {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let (discriminant, mut fields) = value.into_union("PublicKey")?;
        let key = match discriminant {
            0 => PublicKey::Ed25519(fields.next()?),
            other => return Err(unknown_arm("PublicKey", other)),
        };
        fields.finish()?;
        Ok(key)
    }
}

impl XdrDecode for PublicKey {
    fn shape() -> &'static Shape {
        &PUBLIC_KEY
    }
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

static MEMO_TYPE_ENUM: EnumDescriptor = EnumDescriptor {
    name: "MemoType",
    values: &[
        ("MEMO_NONE", 0),
        ("MEMO_TEXT", 1),
        ("MEMO_ID", 2),
        ("MEMO_HASH", 3),
        ("MEMO_RETURN", 4),
    ],
};
static MEMO_TYPE: Shape = Shape::Enum(&MEMO_TYPE_ENUM);
static MEMO_TEXT: Shape = Shape::String(MAX_MEMO_TEXT_LENGTH);
static MEMO_TEXT_FIELDS: [Field; 1] = [Field::required("text", &MEMO_TEXT)];
static MEMO_ID_FIELDS: [Field; 1] = [Field::required("id", &UINT64)];
static MEMO_HASH_FIELDS: [Field; 1] = [Field::required("hash", &HASH)];
static MEMO_RETURN_FIELDS: [Field; 1] = [Field::required("retHash", &HASH)];
static MEMO_ARMS: [Arm; 5] = [
    Arm {
        value: 0,
        name: "MEMO_NONE",
        fields: &[],
    },
    Arm {
        value: 1,
        name: "MEMO_TEXT",
        fields: &MEMO_TEXT_FIELDS,
    },
    Arm {
        value: 2,
        name: "MEMO_ID",
        fields: &MEMO_ID_FIELDS,
    },
    Arm {
        value: 3,
        name: "MEMO_HASH",
        fields: &MEMO_HASH_FIELDS,
    },
    Arm {
        value: 4,
        name: "MEMO_RETURN",
        fields: &MEMO_RETURN_FIELDS,
    },
];
static MEMO_UNION: UnionDescriptor = UnionDescriptor {
    name: "Memo",
    discriminant: &MEMO_TYPE,
    arms: &MEMO_ARMS,
};
pub static MEMO: Shape = Shape::Union(&MEMO_UNION);

/// Free-form data attached to a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Memo {
    #[default]
    None,
    /// At most 28 bytes of UTF-8.
    Text(String),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    /// A text memo, checked against the 28-byte limit.
    pub fn text(text: impl Into<String>) -> Result<Self, XdrError> {
        let text = text.into();
        if text.len() > MAX_MEMO_TEXT_LENGTH as usize {
            return Err(XdrError::LengthExceeded {
                length: text.len() as u64,
                max: MAX_MEMO_TEXT_LENGTH,
            });
        }
        Ok(Memo::Text(text))
    }
}

impl XdrEncode for Memo {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            Memo::None => writer.write_i32(0),
            Memo::Text(text) => {
                writer.write_i32(1);
                writer.write_string(text, MAX_MEMO_TEXT_LENGTH)?;
            }
            Memo::Id(id) => {
                writer.write_i32(2);
                writer.write_u64(*id);
            }
            Memo::Hash(hash) => {
                writer.write_i32(3);
                writer.write_fixed_opaque(hash);
            }
            Memo::Return(hash) => {
                writer.write_i32(4);
                writer.write_fixed_opaque(hash);
            }
        }
        Ok(())
    }
}

impl FromXdrValue for Memo {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let (discriminant, mut fields) = value.into_union("Memo")?;
        let memo = match discriminant {
            0 => Memo::None,
            1 => Memo::Text(fields.next()?),
            2 => Memo::Id(fields.next()?),
            3 => Memo::Hash(fields.next()?),
            4 => Memo::Return(fields.next()?),
            other => return Err(unknown_arm("Memo", other)),
        };
        fields.finish()?;
        Ok(memo)
    }
}

impl XdrDecode for Memo {
    fn shape() -> &'static Shape {
        &MEMO
    }
}

// ---------------------------------------------------------------------------
// TimeBounds
// ---------------------------------------------------------------------------

static TIME_BOUNDS_FIELDS: [Field; 2] = [
    Field::required("minTime", &UINT64),
    Field::required("maxTime", &UINT64),
];
static TIME_BOUNDS_RECORD: RecordDescriptor = RecordDescriptor {
    name: "TimeBounds",
    fields: &TIME_BOUNDS_FIELDS,
};
pub static TIME_BOUNDS: Shape = Shape::Record(&TIME_BOUNDS_RECORD);

/// Validity window of a transaction, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    pub fn new(min_time: u64, max_time: u64) -> Self {
        Self { min_time, max_time }
    }
}

impl XdrEncode for TimeBounds {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_u64(self.min_time);
        writer.write_u64(self.max_time);
        Ok(())
    }
}

impl FromXdrValue for TimeBounds {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("TimeBounds")?;
        let bounds = TimeBounds {
            min_time: fields.next()?,
            max_time: fields.next()?,
        };
        fields.finish()?;
        Ok(bounds)
    }
}

impl XdrDecode for TimeBounds {
    fn shape() -> &'static Shape {
        &TIME_BOUNDS
    }
}

// ---------------------------------------------------------------------------
// Extensions
// ---------------------------------------------------------------------------

static LEDGER_VERSION_ENUM: EnumDescriptor = EnumDescriptor {
    name: "LedgerVersion",
    values: &[("EMPTY_VERSION", 0), ("ADD_TRANSACTION_FEE", 1)],
};
static LEDGER_VERSION: Shape = Shape::Enum(&LEDGER_VERSION_ENUM);

static EMPTY_EXT_ARMS: [Arm; 1] = [Arm {
    value: 0,
    name: "EMPTY_VERSION",
    fields: &[],
}];
static EMPTY_EXT_UNION: UnionDescriptor = UnionDescriptor {
    name: "EmptyExt",
    discriminant: &LEDGER_VERSION,
    arms: &EMPTY_EXT_ARMS,
};
pub static EMPTY_EXT: Shape = Shape::Union(&EMPTY_EXT_UNION);

/// The reserved `ext` slot most records end with. Only the empty arm exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyExt {
    #[default]
    EmptyVersion,
}

impl XdrEncode for EmptyExt {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_i32(0);
        Ok(())
    }
}

impl FromXdrValue for EmptyExt {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let (discriminant, fields) = value.into_union("EmptyExt")?;
        match discriminant {
            0 => {
                fields.finish()?;
                Ok(EmptyExt::EmptyVersion)
            }
            other => Err(unknown_arm("EmptyExt", other)),
        }
    }
}

impl XdrDecode for EmptyExt {
    fn shape() -> &'static Shape {
        &EMPTY_EXT
    }
}

static TRANSACTION_FEE_FIELDS: [Field; 1] = [Field::required("maxTotalFee", &UINT64)];
static TRANSACTION_EXT_ARMS: [Arm; 2] = [
    Arm {
        value: 0,
        name: "EMPTY_VERSION",
        fields: &[],
    },
    Arm {
        value: 1,
        name: "ADD_TRANSACTION_FEE",
        fields: &TRANSACTION_FEE_FIELDS,
    },
];
static TRANSACTION_EXT_UNION: UnionDescriptor = UnionDescriptor {
    name: "TransactionExt",
    discriminant: &LEDGER_VERSION,
    arms: &TRANSACTION_EXT_ARMS,
};
pub static TRANSACTION_EXT: Shape = Shape::Union(&TRANSACTION_EXT_UNION);

/// Transaction extension: empty, or carrying a cap on the total fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransactionExt {
    #[default]
    EmptyVersion,
    AddTransactionFee(u64),
}

impl TransactionExt {
    pub fn max_total_fee(&self) -> Option<u64> {
        match self {
            TransactionExt::EmptyVersion => None,
            TransactionExt::AddTransactionFee(fee) => Some(*fee),
        }
    }
}

impl From<Option<u64>> for TransactionExt {
    fn from(max_total_fee: Option<u64>) -> Self {
        max_total_fee.map_or(TransactionExt::EmptyVersion, TransactionExt::AddTransactionFee)
    }
}

impl XdrEncode for TransactionExt {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        match self {
            TransactionExt::EmptyVersion => writer.write_i32(0),
            TransactionExt::AddTransactionFee(fee) => {
                writer.write_i32(1);
                writer.write_u64(*fee);
            }
        }
        Ok(())
    }
}

impl FromXdrValue for TransactionExt {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let (discriminant, mut fields) = value.into_union("TransactionExt")?;
        let ext = match discriminant {
            0 => TransactionExt::EmptyVersion,
            1 => TransactionExt::AddTransactionFee(fields.next()?),
            other => return Err(unknown_arm("TransactionExt", other)),
        };
        fields.finish()?;
        Ok(ext)
    }
}

impl XdrDecode for TransactionExt {
    fn shape() -> &'static Shape {
        &TRANSACTION_EXT
    }
}

// ---------------------------------------------------------------------------
// TransactionBody
// ---------------------------------------------------------------------------

static OPERATIONS: Shape = Shape::Array(&OPERATION, MAX_OPERATIONS);
static TRANSACTION_FIELDS: [Field; 6] = [
    Field::required("sourceAccount", &PUBLIC_KEY),
    Field::required("salt", &UINT64),
    Field::required("timeBounds", &TIME_BOUNDS),
    Field::required("memo", &MEMO),
    Field::required("operations", &OPERATIONS),
    Field::required("ext", &TRANSACTION_EXT),
];
static TRANSACTION_RECORD: RecordDescriptor = RecordDescriptor {
    name: "Transaction",
    fields: &TRANSACTION_FIELDS,
};
pub static TRANSACTION: Shape = Shape::Record(&TRANSACTION_RECORD);

/// The signed part of a transaction, exactly as it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBody {
    pub source_account: AccountId,
    pub salt: u64,
    pub time_bounds: TimeBounds,
    pub memo: Memo,
    pub operations: Vec<Operation>,
    pub ext: TransactionExt,
}

impl XdrEncode for TransactionBody {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        self.source_account.encode(writer)?;
        writer.write_u64(self.salt);
        self.time_bounds.encode(writer)?;
        self.memo.encode(writer)?;
        encode_array(writer, &self.operations, MAX_OPERATIONS)?;
        self.ext.encode(writer)
    }
}

impl FromXdrValue for TransactionBody {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("Transaction")?;
        let body = TransactionBody {
            source_account: fields.next()?,
            salt: fields.next()?,
            time_bounds: fields.next()?,
            memo: fields.next()?,
            operations: fields.next()?,
            ext: fields.next()?,
        };
        fields.finish()?;
        Ok(body)
    }
}

impl XdrDecode for TransactionBody {
    fn shape() -> &'static Shape {
        &TRANSACTION
    }
}

// ---------------------------------------------------------------------------
// Signatures & envelope
// ---------------------------------------------------------------------------

static SIGNATURE_HINT: Shape = Shape::FixedOpaque(4);
static SIGNATURE: Shape = Shape::Opaque(MAX_SIGNATURE_LENGTH);
static DECORATED_SIGNATURE_FIELDS: [Field; 2] = [
    Field::required("hint", &SIGNATURE_HINT),
    Field::required("signature", &SIGNATURE),
];
static DECORATED_SIGNATURE_RECORD: RecordDescriptor = RecordDescriptor {
    name: "DecoratedSignature",
    fields: &DECORATED_SIGNATURE_FIELDS,
};
pub static DECORATED_SIGNATURE: Shape = Shape::Record(&DECORATED_SIGNATURE_RECORD);

/// A signature plus the last four bytes of the key that made it.
#[derive(Clone, PartialEq, Eq)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: Vec<u8>,
}

impl fmt::Debug for DecoratedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedSignature")
            .field("hint", &hex::encode(self.hint))
            .field("signature", &hex::encode(&self.signature))
            .finish()
    }
}

impl XdrEncode for DecoratedSignature {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_fixed_opaque(&self.hint);
        writer.write_opaque(&self.signature, MAX_SIGNATURE_LENGTH)
    }
}

impl FromXdrValue for DecoratedSignature {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("DecoratedSignature")?;
        let signature = DecoratedSignature {
            hint: fields.next()?,
            signature: fields.next()?,
        };
        fields.finish()?;
        Ok(signature)
    }
}

impl XdrDecode for DecoratedSignature {
    fn shape() -> &'static Shape {
        &DECORATED_SIGNATURE
    }
}

static SIGNATURES: Shape = Shape::Array(&DECORATED_SIGNATURE, MAX_SIGNATURES);
static ENVELOPE_FIELDS: [Field; 2] = [
    Field::required("tx", &TRANSACTION),
    Field::required("signatures", &SIGNATURES),
];
static ENVELOPE_RECORD: RecordDescriptor = RecordDescriptor {
    name: "TransactionEnvelope",
    fields: &ENVELOPE_FIELDS,
};
pub static TRANSACTION_ENVELOPE: Shape = Shape::Record(&ENVELOPE_RECORD);

/// A transaction body with its signatures. This is what gets submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub tx: TransactionBody,
    pub signatures: Vec<DecoratedSignature>,
}

impl XdrEncode for TransactionEnvelope {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        self.tx.encode(writer)?;
        encode_array(writer, &self.signatures, MAX_SIGNATURES)
    }
}

impl FromXdrValue for TransactionEnvelope {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("TransactionEnvelope")?;
        let envelope = TransactionEnvelope {
            tx: fields.next()?,
            signatures: fields.next()?,
        };
        fields.finish()?;
        Ok(envelope)
    }
}

impl XdrDecode for TransactionEnvelope {
    fn shape() -> &'static Shape {
        &TRANSACTION_ENVELOPE
    }
}
