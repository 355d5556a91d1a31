//! Operation bodies.
//!
//! Only the operations this wallet actually builds are described here:
//! payments and balance management. Adding another one means a Rust type, a
//! descriptor, and one arm in [`OperationBody`]; the decoder stays untouched.

use crate::config::{MAX_ASSET_CODE_LENGTH, MAX_REFERENCE_LENGTH, MAX_SUBJECT_LENGTH};

use super::codec::XdrEncode;
use super::schema::{
    Arm, EnumDescriptor, Field, FromXdrValue, RecordDescriptor, Shape, UnionDescriptor,
    XdrDecode, XdrValue, BOOL, INT64, UINT64,
};
use super::stream::XdrWriter;
use super::types::{AccountId, BalanceId, EmptyExt, EMPTY_EXT, PUBLIC_KEY};
use super::XdrError;

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

static FEE_DATA_FIELDS: [Field; 3] = [
    Field::required("fixedFee", &INT64),
    Field::required("percentFee", &INT64),
    Field::required("ext", &EMPTY_EXT),
];
static FEE_DATA_RECORD: RecordDescriptor = RecordDescriptor {
    name: "FeeData",
    fields: &FEE_DATA_FIELDS,
};
pub static FEE_DATA: Shape = Shape::Record(&FEE_DATA_RECORD);

/// A fee charged on one side of a payment, in precised units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
    pub fixed_fee: i64,
    pub percent_fee: i64,
    pub ext: EmptyExt,
}

impl FeeData {
    pub fn new(fixed_fee: i64, percent_fee: i64) -> Self {
        Self {
            fixed_fee,
            percent_fee,
            ext: EmptyExt::EmptyVersion,
        }
    }
}

impl XdrEncode for FeeData {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_i64(self.fixed_fee);
        writer.write_i64(self.percent_fee);
        self.ext.encode(writer)
    }
}

impl FromXdrValue for FeeData {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("FeeData")?;
        let fee = FeeData {
            fixed_fee: fields.next()?,
            percent_fee: fields.next()?,
            ext: fields.next()?,
        };
        fields.finish()?;
        Ok(fee)
    }
}

impl XdrDecode for FeeData {
    fn shape() -> &'static Shape {
        &FEE_DATA
    }
}

static PAYMENT_FEE_DATA_FIELDS: [Field; 4] = [
    Field::required("sourceFee", &FEE_DATA),
    Field::required("destinationFee", &FEE_DATA),
    Field::required("sourcePaysForDest", &BOOL),
    Field::required("ext", &EMPTY_EXT),
];
static PAYMENT_FEE_DATA_RECORD: RecordDescriptor = RecordDescriptor {
    name: "PaymentFeeData",
    fields: &PAYMENT_FEE_DATA_FIELDS,
};
pub static PAYMENT_FEE_DATA: Shape = Shape::Record(&PAYMENT_FEE_DATA_RECORD);

/// Fees on both sides of a payment and who covers the receiver's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentFeeData {
    pub source_fee: FeeData,
    pub destination_fee: FeeData,
    pub source_pays_for_dest: bool,
    pub ext: EmptyExt,
}

impl PaymentFeeData {
    pub fn new(source_fee: FeeData, destination_fee: FeeData, source_pays_for_dest: bool) -> Self {
        Self {
            source_fee,
            destination_fee,
            source_pays_for_dest,
            ext: EmptyExt::EmptyVersion,
        }
    }
}

impl XdrEncode for PaymentFeeData {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        self.source_fee.encode(writer)?;
        self.destination_fee.encode(writer)?;
        writer.write_bool(self.source_pays_for_dest);
        self.ext.encode(writer)
    }
}

impl FromXdrValue for PaymentFeeData {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("PaymentFeeData")?;
        let fees = PaymentFeeData {
            source_fee: fields.next()?,
            destination_fee: fields.next()?,
            source_pays_for_dest: fields.next()?,
            ext: fields.next()?,
        };
        fields.finish()?;
        Ok(fees)
    }
}

impl XdrDecode for PaymentFeeData {
    fn shape() -> &'static Shape {
        &PAYMENT_FEE_DATA
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

static INVOICE_REFERENCE_FIELDS: [Field; 3] = [
    Field::required("invoiceID", &UINT64),
    Field::required("accept", &BOOL),
    Field::required("ext", &EMPTY_EXT),
];
static INVOICE_REFERENCE_RECORD: RecordDescriptor = RecordDescriptor {
    name: "InvoiceReference",
    fields: &INVOICE_REFERENCE_FIELDS,
};
pub static INVOICE_REFERENCE: Shape = Shape::Record(&INVOICE_REFERENCE_RECORD);

/// Links a payment to the invoice it settles or rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceReference {
    pub invoice_id: u64,
    pub accept: bool,
    pub ext: EmptyExt,
}

impl XdrEncode for InvoiceReference {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_u64(self.invoice_id);
        writer.write_bool(self.accept);
        self.ext.encode(writer)
    }
}

impl FromXdrValue for InvoiceReference {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("InvoiceReference")?;
        let reference = InvoiceReference {
            invoice_id: fields.next()?,
            accept: fields.next()?,
            ext: fields.next()?,
        };
        fields.finish()?;
        Ok(reference)
    }
}

static SUBJECT: Shape = Shape::String(MAX_SUBJECT_LENGTH);
static REFERENCE: Shape = Shape::String(MAX_REFERENCE_LENGTH);
static PAYMENT_OP_FIELDS: [Field; 8] = [
    Field::required("sourceBalanceID", &PUBLIC_KEY),
    Field::required("destinationBalanceID", &PUBLIC_KEY),
    Field::required("amount", &INT64),
    Field::required("feeData", &PAYMENT_FEE_DATA),
    Field::required("subject", &SUBJECT),
    Field::required("reference", &REFERENCE),
    Field::optional("invoiceReference", &INVOICE_REFERENCE),
    Field::required("ext", &EMPTY_EXT),
];
static PAYMENT_OP_RECORD: RecordDescriptor = RecordDescriptor {
    name: "PaymentOp",
    fields: &PAYMENT_OP_FIELDS,
};
pub static PAYMENT_OP: Shape = Shape::Record(&PAYMENT_OP_RECORD);

/// Move `amount` from one balance to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOp {
    pub source_balance_id: BalanceId,
    pub destination_balance_id: BalanceId,
    pub amount: i64,
    pub fee_data: PaymentFeeData,
    pub subject: String,
    pub reference: String,
    pub invoice_reference: Option<InvoiceReference>,
    pub ext: EmptyExt,
}

impl PaymentOp {
    /// A plain payment: no reference, no invoice.
    pub fn simple(
        source_balance_id: BalanceId,
        destination_balance_id: BalanceId,
        amount: i64,
        fee_data: PaymentFeeData,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            source_balance_id,
            destination_balance_id,
            amount,
            fee_data,
            subject: subject.into(),
            reference: String::new(),
            invoice_reference: None,
            ext: EmptyExt::EmptyVersion,
        }
    }
}

impl XdrEncode for PaymentOp {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        self.source_balance_id.encode(writer)?;
        self.destination_balance_id.encode(writer)?;
        writer.write_i64(self.amount);
        self.fee_data.encode(writer)?;
        writer.write_string(&self.subject, MAX_SUBJECT_LENGTH)?;
        writer.write_string(&self.reference, MAX_REFERENCE_LENGTH)?;
        self.invoice_reference.encode(writer)?;
        self.ext.encode(writer)
    }
}

impl FromXdrValue for PaymentOp {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("PaymentOp")?;
        let op = PaymentOp {
            source_balance_id: fields.next()?,
            destination_balance_id: fields.next()?,
            amount: fields.next()?,
            fee_data: fields.next()?,
            subject: fields.next()?,
            reference: fields.next()?,
            invoice_reference: fields.next()?,
            ext: fields.next()?,
        };
        fields.finish()?;
        Ok(op)
    }
}

impl XdrDecode for PaymentOp {
    fn shape() -> &'static Shape {
        &PAYMENT_OP
    }
}

// ---------------------------------------------------------------------------
// Manage balance
// ---------------------------------------------------------------------------

static MANAGE_BALANCE_ACTION_ENUM: EnumDescriptor = EnumDescriptor {
    name: "ManageBalanceAction",
    values: &[("CREATE", 0), ("DELETE_BALANCE", 1), ("CREATE_UNIQUE", 2)],
};
pub static MANAGE_BALANCE_ACTION: Shape = Shape::Enum(&MANAGE_BALANCE_ACTION_ENUM);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageBalanceAction {
    Create = 0,
    DeleteBalance = 1,
    /// Create, but fail if the account already has a balance in this asset.
    CreateUnique = 2,
}

impl XdrEncode for ManageBalanceAction {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_i32(*self as i32);
        Ok(())
    }
}

impl FromXdrValue for ManageBalanceAction {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        match value.into_enum("ManageBalanceAction")? {
            0 => Ok(ManageBalanceAction::Create),
            1 => Ok(ManageBalanceAction::DeleteBalance),
            2 => Ok(ManageBalanceAction::CreateUnique),
            value => Err(XdrError::UnknownEnumValue {
                name: "ManageBalanceAction",
                value,
            }),
        }
    }
}

static ASSET_CODE: Shape = Shape::String(MAX_ASSET_CODE_LENGTH);
static MANAGE_BALANCE_OP_FIELDS: [Field; 4] = [
    Field::required("action", &MANAGE_BALANCE_ACTION),
    Field::required("destination", &PUBLIC_KEY),
    Field::required("asset", &ASSET_CODE),
    Field::required("ext", &EMPTY_EXT),
];
static MANAGE_BALANCE_OP_RECORD: RecordDescriptor = RecordDescriptor {
    name: "ManageBalanceOp",
    fields: &MANAGE_BALANCE_OP_FIELDS,
};
pub static MANAGE_BALANCE_OP: Shape = Shape::Record(&MANAGE_BALANCE_OP_RECORD);

/// Create or delete an account's balance in some asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManageBalanceOp {
    pub action: ManageBalanceAction,
    pub destination: AccountId,
    pub asset: String,
    pub ext: EmptyExt,
}

impl ManageBalanceOp {
    pub fn new(action: ManageBalanceAction, destination: AccountId, asset: impl Into<String>) -> Self {
        Self {
            action,
            destination,
            asset: asset.into(),
            ext: EmptyExt::EmptyVersion,
        }
    }

    pub fn create(destination: AccountId, asset: impl Into<String>) -> Self {
        Self::new(ManageBalanceAction::Create, destination, asset)
    }

    pub fn create_unique(destination: AccountId, asset: impl Into<String>) -> Self {
        Self::new(ManageBalanceAction::CreateUnique, destination, asset)
    }

    pub fn delete(destination: AccountId, asset: impl Into<String>) -> Self {
        Self::new(ManageBalanceAction::DeleteBalance, destination, asset)
    }
}

impl XdrEncode for ManageBalanceOp {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        self.action.encode(writer)?;
        self.destination.encode(writer)?;
        writer.write_string(&self.asset, MAX_ASSET_CODE_LENGTH)?;
        self.ext.encode(writer)
    }
}

impl FromXdrValue for ManageBalanceOp {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("ManageBalanceOp")?;
        let op = ManageBalanceOp {
            action: fields.next()?,
            destination: fields.next()?,
            asset: fields.next()?,
            ext: fields.next()?,
        };
        fields.finish()?;
        Ok(op)
    }
}

impl XdrDecode for ManageBalanceOp {
    fn shape() -> &'static Shape {
        &MANAGE_BALANCE_OP
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

static OPERATION_TYPE_ENUM: EnumDescriptor = EnumDescriptor {
    name: "OperationType",
    values: &[("PAYMENT", 1), ("MANAGE_BALANCE", 9)],
};
static OPERATION_TYPE: Shape = Shape::Enum(&OPERATION_TYPE_ENUM);
static PAYMENT_ARM_FIELDS: [Field; 1] = [Field::required("paymentOp", &PAYMENT_OP)];
static MANAGE_BALANCE_ARM_FIELDS: [Field; 1] =
    [Field::required("manageBalanceOp", &MANAGE_BALANCE_OP)];
static OPERATION_BODY_ARMS: [Arm; 2] = [
    Arm {
        value: 1,
        name: "PAYMENT",
        fields: &PAYMENT_ARM_FIELDS,
    },
    Arm {
        value: 9,
        name: "MANAGE_BALANCE",
        fields: &MANAGE_BALANCE_ARM_FIELDS,
    },
];
static OPERATION_BODY_UNION: UnionDescriptor = UnionDescriptor {
    name: "OperationBody",
    discriminant: &OPERATION_TYPE,
    arms: &OPERATION_BODY_ARMS,
};
pub static OPERATION_BODY: Shape = Shape::Union(&OPERATION_BODY_UNION);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationBody {
    Payment(PaymentOp),
    ManageBalance(ManageBalanceOp),
}

impl OperationBody {
    /// Wire value of the operation type.
    pub fn operation_type(&self) -> i32 {
        match self {
            OperationBody::Payment(_) => 1,
            OperationBody::ManageBalance(_) => 9,
        }
    }
}

impl XdrEncode for OperationBody {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        writer.write_i32(self.operation_type());
        match self {
            OperationBody::Payment(op) => op.encode(writer),
            OperationBody::ManageBalance(op) => op.encode(writer),
        }
    }
}

impl FromXdrValue for OperationBody {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let (discriminant, mut fields) = value.into_union("OperationBody")?;
        let body = match discriminant {
            1 => OperationBody::Payment(fields.next()?),
            9 => OperationBody::ManageBalance(fields.next()?),
            value => {
                return Err(XdrError::UnknownDiscriminant {
                    union: "OperationBody",
                    value,
                })
            }
        };
        fields.finish()?;
        Ok(body)
    }
}

impl XdrDecode for OperationBody {
    fn shape() -> &'static Shape {
        &OPERATION_BODY
    }
}

static OPERATION_FIELDS: [Field; 2] = [
    Field::optional("sourceAccount", &PUBLIC_KEY),
    Field::required("body", &OPERATION_BODY),
];
static OPERATION_RECORD: RecordDescriptor = RecordDescriptor {
    name: "Operation",
    fields: &OPERATION_FIELDS,
};
pub static OPERATION: Shape = Shape::Record(&OPERATION_RECORD);

/// One step of a transaction, optionally run on behalf of another account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub source_account: Option<AccountId>,
    pub body: OperationBody,
}

impl From<OperationBody> for Operation {
    fn from(body: OperationBody) -> Self {
        Self {
            source_account: None,
            body,
        }
    }
}

impl XdrEncode for Operation {
    fn encode(&self, writer: &mut XdrWriter) -> Result<(), XdrError> {
        self.source_account.encode(writer)?;
        self.body.encode(writer)
    }
}

impl FromXdrValue for Operation {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let mut fields = value.into_record("Operation")?;
        let op = Operation {
            source_account: fields.next()?,
            body: fields.next()?,
        };
        fields.finish()?;
        Ok(op)
    }
}

impl XdrDecode for Operation {
    fn shape() -> &'static Shape {
        &OPERATION
    }
}
