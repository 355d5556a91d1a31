//! # Schema Descriptors & the Generic Decoder
//!
//! Hand-writing a decoder for every record type is how codecs drift: the
//! encoder gets a new field, the decoder does not, and nobody notices until
//! a validator does. Instead, every decodable type publishes a static
//! [`Shape`]: for records an ordered field list with optionality flags, for
//! enums the explicit value table, for unions the discriminant shape plus an
//! explicit discriminant-value → arm table.
//!
//! [`read_value`] is the only decoder. It walks a shape and produces an
//! [`XdrValue`] tree; [`FromXdrValue`] turns that tree into the typed value.
//! [`write_value`] is the mirror image, used to re-encode trees and to check
//! that descriptors and direct encoders agree.
//!
//! Union arms are found by the discriminant's *value*, never by a name or
//! by position. Enum values are matched the same way.
//!
//! Descriptors reference each other only through named statics, so every
//! `&'static Shape` in a schema is a plain address of another static.

use super::codec::decode_base64;
use super::stream::{padding_for, XdrReader, XdrWriter};
use super::XdrError;

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// The wire shape of a value.
#[derive(Debug)]
pub enum Shape {
    Int32,
    Uint32,
    Int64,
    Uint64,
    Bool,
    /// `string<max>`
    String(u32),
    /// `opaque<max>`
    Opaque(u32),
    /// `opaque[n]`
    FixedOpaque(usize),
    /// `T<max>`
    Array(&'static Shape, u32),
    Enum(&'static EnumDescriptor),
    Union(&'static UnionDescriptor),
    Record(&'static RecordDescriptor),
}

pub static INT32: Shape = Shape::Int32;
pub static UINT32: Shape = Shape::Uint32;
pub static INT64: Shape = Shape::Int64;
pub static UINT64: Shape = Shape::Uint64;
pub static BOOL: Shape = Shape::Bool;

/// One field of a record or union arm.
#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub shape: &'static Shape,
    /// Encoded as a presence flag followed by the value when present.
    pub optional: bool,
}

impl Field {
    pub const fn required(name: &'static str, shape: &'static Shape) -> Self {
        Self {
            name,
            shape,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str, shape: &'static Shape) -> Self {
        Self {
            name,
            shape,
            optional: true,
        }
    }
}

#[derive(Debug)]
pub struct RecordDescriptor {
    pub name: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug)]
pub struct EnumDescriptor {
    pub name: &'static str,
    /// `(name, wire value)` pairs.
    pub values: &'static [(&'static str, i32)],
}

impl EnumDescriptor {
    pub fn contains(&self, value: i32) -> bool {
        self.values.iter().any(|(_, v)| *v == value)
    }

    pub fn name_of(&self, value: i32) -> Option<&'static str> {
        self.values
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| *name)
    }
}

/// One arm of a union. An empty field list is a `void` arm.
#[derive(Debug)]
pub struct Arm {
    pub value: i32,
    pub name: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug)]
pub struct UnionDescriptor {
    pub name: &'static str,
    /// An `Enum`, `Int32` or `Uint32` shape.
    pub discriminant: &'static Shape,
    pub arms: &'static [Arm],
}

impl UnionDescriptor {
    pub fn arm(&self, value: i32) -> Option<&'static Arm> {
        self.arms.iter().find(|arm| arm.value == value)
    }
}

impl Shape {
    /// Human-readable name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Int32 => "int32",
            Shape::Uint32 => "uint32",
            Shape::Int64 => "int64",
            Shape::Uint64 => "uint64",
            Shape::Bool => "bool",
            Shape::String(_) => "string",
            Shape::Opaque(_) => "opaque",
            Shape::FixedOpaque(_) => "fixed opaque",
            Shape::Array(..) => "array",
            Shape::Enum(desc) => desc.name,
            Shape::Union(desc) => desc.name,
            Shape::Record(desc) => desc.name,
        }
    }

    /// The fewest bytes any value of this shape can occupy on the wire.
    pub fn min_size(&self) -> usize {
        match self {
            Shape::Int32 | Shape::Uint32 | Shape::Bool | Shape::Enum(_) => 4,
            Shape::Int64 | Shape::Uint64 => 8,
            Shape::String(_) | Shape::Opaque(_) | Shape::Array(..) => 4,
            Shape::FixedOpaque(n) => n + padding_for(*n),
            Shape::Union(desc) => {
                desc.discriminant.min_size()
                    + desc
                        .arms
                        .iter()
                        .map(|arm| fields_min_size(arm.fields))
                        .min()
                        .unwrap_or(0)
            }
            Shape::Record(desc) => fields_min_size(desc.fields),
        }
    }
}

fn fields_min_size(fields: &[Field]) -> usize {
    fields
        .iter()
        .map(|f| if f.optional { 4 } else { f.shape.min_size() })
        .sum()
}

// ---------------------------------------------------------------------------
// Dynamic values
// ---------------------------------------------------------------------------

/// A decoded value, shaped like the descriptor it was read with.
///
/// Field names live in the descriptor, not here: a record is just its field
/// values in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XdrValue {
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Bool(bool),
    String(String),
    /// Both fixed and variable opaque data.
    Opaque(Vec<u8>),
    Array(Vec<XdrValue>),
    /// An optional field.
    Optional(Option<Box<XdrValue>>),
    Enum(i32),
    Union {
        discriminant: i32,
        fields: Vec<XdrValue>,
    },
    Record(Vec<XdrValue>),
}

impl XdrValue {
    pub fn kind(&self) -> &'static str {
        match self {
            XdrValue::Int32(_) => "int32",
            XdrValue::Uint32(_) => "uint32",
            XdrValue::Int64(_) => "int64",
            XdrValue::Uint64(_) => "uint64",
            XdrValue::Bool(_) => "bool",
            XdrValue::String(_) => "string",
            XdrValue::Opaque(_) => "opaque",
            XdrValue::Array(_) => "array",
            XdrValue::Optional(_) => "optional",
            XdrValue::Enum(_) => "enum",
            XdrValue::Union { .. } => "union",
            XdrValue::Record(_) => "record",
        }
    }

    /// Field values of a record, in declaration order.
    pub fn into_record(self, owner: &'static str) -> Result<FieldValues, XdrError> {
        match self {
            XdrValue::Record(fields) => Ok(FieldValues::new(owner, fields)),
            other => Err(mismatch(owner, &other)),
        }
    }

    /// Discriminant and arm field values of a union.
    pub fn into_union(self, owner: &'static str) -> Result<(i32, FieldValues), XdrError> {
        match self {
            XdrValue::Union {
                discriminant,
                fields,
            } => Ok((discriminant, FieldValues::new(owner, fields))),
            other => Err(mismatch(owner, &other)),
        }
    }

    pub fn into_enum(self, owner: &'static str) -> Result<i32, XdrError> {
        match self {
            XdrValue::Enum(value) => Ok(value),
            other => Err(mismatch(owner, &other)),
        }
    }
}

fn mismatch(expected: &'static str, found: &XdrValue) -> XdrError {
    XdrError::ShapeMismatch {
        expected,
        found: found.kind(),
    }
}

/// Cursor over the field values of a record or union arm.
#[derive(Debug)]
pub struct FieldValues {
    owner: &'static str,
    fields: std::vec::IntoIter<XdrValue>,
}

impl FieldValues {
    fn new(owner: &'static str, fields: Vec<XdrValue>) -> Self {
        Self {
            owner,
            fields: fields.into_iter(),
        }
    }

    /// Convert the next field.
    pub fn next<T: FromXdrValue>(&mut self) -> Result<T, XdrError> {
        let value = self.fields.next().ok_or(XdrError::ShapeMismatch {
            expected: self.owner,
            found: "missing field",
        })?;
        T::from_value(value)
    }

    /// Fail if the descriptor produced more fields than the type consumed.
    pub fn finish(mut self) -> Result<(), XdrError> {
        match self.fields.next() {
            None => Ok(()),
            Some(extra) => Err(mismatch(self.owner, &extra)),
        }
    }
}

// ---------------------------------------------------------------------------
// Generic read / write
// ---------------------------------------------------------------------------

fn read_discriminant(shape: &Shape, reader: &mut XdrReader<'_>) -> Result<i32, XdrError> {
    match read_value(shape, reader)? {
        XdrValue::Enum(value) | XdrValue::Int32(value) => Ok(value),
        XdrValue::Uint32(value) => Ok(value as i32),
        other => Err(mismatch("union discriminant", &other)),
    }
}

fn read_fields(fields: &[Field], reader: &mut XdrReader<'_>) -> Result<Vec<XdrValue>, XdrError> {
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let value = if field.optional {
            if reader.read_bool()? {
                XdrValue::Optional(Some(Box::new(read_value(field.shape, reader)?)))
            } else {
                XdrValue::Optional(None)
            }
        } else {
            read_value(field.shape, reader)?
        };
        values.push(value);
    }
    Ok(values)
}

/// Decode one value of `shape` from `reader`.
pub fn read_value(shape: &Shape, reader: &mut XdrReader<'_>) -> Result<XdrValue, XdrError> {
    let value = match shape {
        Shape::Int32 => XdrValue::Int32(reader.read_i32()?),
        Shape::Uint32 => XdrValue::Uint32(reader.read_u32()?),
        Shape::Int64 => XdrValue::Int64(reader.read_i64()?),
        Shape::Uint64 => XdrValue::Uint64(reader.read_u64()?),
        Shape::Bool => XdrValue::Bool(reader.read_bool()?),
        Shape::String(max) => XdrValue::String(reader.read_string(*max)?),
        Shape::Opaque(max) => XdrValue::Opaque(reader.read_opaque(*max)?.to_vec()),
        Shape::FixedOpaque(len) => XdrValue::Opaque(reader.read_fixed_opaque(*len)?.to_vec()),
        Shape::Array(element, max) => {
            let len = reader.read_length(*max, element.min_size())?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(read_value(element, reader)?);
            }
            XdrValue::Array(items)
        }
        Shape::Enum(desc) => {
            let value = reader.read_i32()?;
            if !desc.contains(value) {
                return Err(XdrError::UnknownEnumValue {
                    name: desc.name,
                    value,
                });
            }
            XdrValue::Enum(value)
        }
        Shape::Union(desc) => {
            let discriminant = read_discriminant(desc.discriminant, reader)?;
            let arm = desc.arm(discriminant).ok_or(XdrError::UnknownDiscriminant {
                union: desc.name,
                value: discriminant,
            })?;
            XdrValue::Union {
                discriminant,
                fields: read_fields(arm.fields, reader)?,
            }
        }
        Shape::Record(desc) => XdrValue::Record(read_fields(desc.fields, reader)?),
    };
    Ok(value)
}

fn write_fields(
    owner: &'static str,
    fields: &[Field],
    values: &[XdrValue],
    writer: &mut XdrWriter,
) -> Result<(), XdrError> {
    if fields.len() != values.len() {
        return Err(XdrError::ShapeMismatch {
            expected: owner,
            found: "wrong field count",
        });
    }
    for (field, value) in fields.iter().zip(values) {
        if field.optional {
            match value {
                XdrValue::Optional(Some(inner)) => {
                    writer.write_bool(true);
                    write_value(field.shape, inner, writer)?;
                }
                XdrValue::Optional(None) => writer.write_bool(false),
                other => return Err(mismatch("optional", other)),
            }
        } else {
            write_value(field.shape, value, writer)?;
        }
    }
    Ok(())
}

/// Encode `value` as `shape`. Fails if the two do not line up.
pub fn write_value(shape: &Shape, value: &XdrValue, writer: &mut XdrWriter) -> Result<(), XdrError> {
    match (shape, value) {
        (Shape::Int32, XdrValue::Int32(v)) => writer.write_i32(*v),
        (Shape::Uint32, XdrValue::Uint32(v)) => writer.write_u32(*v),
        (Shape::Int64, XdrValue::Int64(v)) => writer.write_i64(*v),
        (Shape::Uint64, XdrValue::Uint64(v)) => writer.write_u64(*v),
        (Shape::Bool, XdrValue::Bool(v)) => writer.write_bool(*v),
        (Shape::String(max), XdrValue::String(v)) => writer.write_string(v, *max)?,
        (Shape::Opaque(max), XdrValue::Opaque(v)) => writer.write_opaque(v, *max)?,
        (Shape::FixedOpaque(len), XdrValue::Opaque(v)) => {
            if v.len() != *len {
                return Err(XdrError::WrongFixedLength {
                    expected: *len,
                    found: v.len(),
                });
            }
            writer.write_fixed_opaque(v);
        }
        (Shape::Array(element, max), XdrValue::Array(items)) => {
            writer.write_length(items.len(), *max)?;
            for item in items {
                write_value(element, item, writer)?;
            }
        }
        (Shape::Enum(desc), XdrValue::Enum(v)) => {
            if !desc.contains(*v) {
                return Err(XdrError::UnknownEnumValue {
                    name: desc.name,
                    value: *v,
                });
            }
            writer.write_i32(*v);
        }
        (
            Shape::Union(desc),
            XdrValue::Union {
                discriminant,
                fields,
            },
        ) => {
            let arm = desc.arm(*discriminant).ok_or(XdrError::UnknownDiscriminant {
                union: desc.name,
                value: *discriminant,
            })?;
            let tag = match desc.discriminant {
                Shape::Enum(_) => XdrValue::Enum(*discriminant),
                Shape::Uint32 => XdrValue::Uint32(*discriminant as u32),
                _ => XdrValue::Int32(*discriminant),
            };
            write_value(desc.discriminant, &tag, writer)?;
            write_fields(desc.name, arm.fields, fields, writer)?;
        }
        (Shape::Record(desc), XdrValue::Record(fields)) => {
            write_fields(desc.name, desc.fields, fields, writer)?;
        }
        (shape, value) => return Err(mismatch(shape.name(), value)),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Typed conversion
// ---------------------------------------------------------------------------

/// Conversion out of a decoded [`XdrValue`].
pub trait FromXdrValue: Sized {
    fn from_value(value: XdrValue) -> Result<Self, XdrError>;
}

/// A type with a static shape descriptor, decodable from bytes.
pub trait XdrDecode: FromXdrValue {
    fn shape() -> &'static Shape;

    fn from_xdr(bytes: &[u8]) -> Result<Self, XdrError> {
        decode(bytes)
    }

    fn from_base64(text: &str) -> Result<Self, XdrError> {
        decode(&decode_base64(text)?)
    }
}

/// Decode exactly one `T` from `bytes`. Trailing bytes are an error.
pub fn decode<T: XdrDecode>(bytes: &[u8]) -> Result<T, XdrError> {
    let mut reader = XdrReader::new(bytes);
    let value = read_value(T::shape(), &mut reader)?;
    reader.finish()?;
    T::from_value(value)
}

macro_rules! scalar_from_value {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl FromXdrValue for $ty {
            fn from_value(value: XdrValue) -> Result<Self, XdrError> {
                match value {
                    XdrValue::$variant(v) => Ok(v),
                    other => Err(mismatch($name, &other)),
                }
            }
        }
    };
}

scalar_from_value!(i32, Int32, "int32");
scalar_from_value!(u32, Uint32, "uint32");
scalar_from_value!(i64, Int64, "int64");
scalar_from_value!(u64, Uint64, "uint64");
scalar_from_value!(bool, Bool, "bool");
scalar_from_value!(String, String, "string");
scalar_from_value!(Vec<u8>, Opaque, "opaque");

impl<const N: usize> FromXdrValue for [u8; N] {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        let bytes = Vec::<u8>::from_value(value)?;
        let found = bytes.len();
        bytes.try_into().map_err(|_| XdrError::WrongFixedLength { expected: N, found })
    }
}

impl<T: FromXdrValue> FromXdrValue for Vec<T> {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        match value {
            XdrValue::Array(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch("array", &other)),
        }
    }
}

impl<T: FromXdrValue> FromXdrValue for Option<T> {
    fn from_value(value: XdrValue) -> Result<Self, XdrError> {
        match value {
            XdrValue::Optional(inner) => inner.map(|v| T::from_value(*v)).transpose(),
            other => Err(mismatch("optional", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A small schema that exercises every shape kind.

    static COLOR_ENUM: EnumDescriptor = EnumDescriptor {
        name: "Color",
        values: &[("RED", 0), ("GREEN", 5), ("BLUE", -1)],
    };
    static COLOR: Shape = Shape::Enum(&COLOR_ENUM);

    static NAME: Shape = Shape::String(8);
    static BLOB: Shape = Shape::Opaque(16);
    static HASH: Shape = Shape::FixedOpaque(3);
    static NUMBERS: Shape = Shape::Array(&UINT32, 4);

    static SHAPE_ARMS: [Arm; 2] = [
        Arm {
            value: 0,
            name: "none",
            fields: &[],
        },
        Arm {
            value: 5,
            name: "green",
            fields: &SHAPE_GREEN_FIELDS,
        },
    ];
    static SHAPE_GREEN_FIELDS: [Field; 2] =
        [Field::required("id", &UINT64), Field::optional("label", &NAME)];
    static SHAPE_UNION: UnionDescriptor = UnionDescriptor {
        name: "Paint",
        discriminant: &COLOR,
        arms: &SHAPE_ARMS,
    };
    static PAINT: Shape = Shape::Union(&SHAPE_UNION);

    static SAMPLE_FIELDS: [Field; 8] = [
        Field::required("a", &INT32),
        Field::required("flag", &BOOL),
        Field::required("name", &NAME),
        Field::required("blob", &BLOB),
        Field::required("hash", &HASH),
        Field::required("numbers", &NUMBERS),
        Field::optional("big", &INT64),
        Field::required("paint", &PAINT),
    ];
    static SAMPLE_RECORD: RecordDescriptor = RecordDescriptor {
        name: "Sample",
        fields: &SAMPLE_FIELDS,
    };
    static SAMPLE: Shape = Shape::Record(&SAMPLE_RECORD);

    fn sample_value() -> XdrValue {
        XdrValue::Record(vec![
            XdrValue::Int32(-7),
            XdrValue::Bool(true),
            XdrValue::String("abc".into()),
            XdrValue::Opaque(vec![1, 2, 3, 4, 5]),
            XdrValue::Opaque(vec![9, 9, 9]),
            XdrValue::Array(vec![XdrValue::Uint32(1), XdrValue::Uint32(2)]),
            XdrValue::Optional(None),
            XdrValue::Union {
                discriminant: 5,
                fields: vec![
                    XdrValue::Uint64(42),
                    XdrValue::Optional(Some(Box::new(XdrValue::String("hi".into())))),
                ],
            },
        ])
    }

    fn encode(shape: &Shape, value: &XdrValue) -> Vec<u8> {
        let mut w = XdrWriter::new();
        write_value(shape, value, &mut w).unwrap();
        w.into_bytes()
    }

    #[test]
    fn every_shape_kind_roundtrips() {
        let value = sample_value();
        let bytes = encode(&SAMPLE, &value);
        assert_eq!(bytes.len() % 4, 0);

        let mut r = XdrReader::new(&bytes);
        assert_eq!(read_value(&SAMPLE, &mut r).unwrap(), value);
        r.finish().unwrap();
    }

    #[test]
    fn union_arm_is_selected_by_value_not_position() {
        // GREEN is the second enumerator but has wire value 5.
        let bytes = [0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0];
        let mut r = XdrReader::new(&bytes);
        let value = read_value(&PAINT, &mut r).unwrap();
        assert_eq!(
            value,
            XdrValue::Union {
                discriminant: 5,
                fields: vec![XdrValue::Uint64(1), XdrValue::Optional(None)],
            }
        );
    }

    #[test]
    fn negative_enum_values_are_supported() {
        let bytes = (-1i32).to_be_bytes();
        let mut r = XdrReader::new(&bytes);
        assert_eq!(read_value(&COLOR, &mut r).unwrap(), XdrValue::Enum(-1));
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let bytes = 1i32.to_be_bytes();
        let mut r = XdrReader::new(&bytes);
        assert_eq!(
            read_value(&COLOR, &mut r),
            Err(XdrError::UnknownEnumValue {
                name: "Color",
                value: 1
            })
        );
    }

    #[test]
    fn known_enum_value_without_arm_is_rejected() {
        // BLUE is a valid Color but Paint has no arm for it.
        let bytes = (-1i32).to_be_bytes();
        let mut r = XdrReader::new(&bytes);
        assert_eq!(
            read_value(&PAINT, &mut r),
            Err(XdrError::UnknownDiscriminant {
                union: "Paint",
                value: -1
            })
        );
    }

    #[test]
    fn truncated_record_fails() {
        let bytes = encode(&SAMPLE, &sample_value());
        for cut in [0, 3, 8, bytes.len() - 1] {
            let mut r = XdrReader::new(&bytes[..cut]);
            assert!(
                matches!(read_value(&SAMPLE, &mut r), Err(XdrError::UnexpectedEof { .. })),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn write_detects_shape_mismatch() {
        let mut w = XdrWriter::new();
        assert_eq!(
            write_value(&UINT64, &XdrValue::Int32(1), &mut w),
            Err(XdrError::ShapeMismatch {
                expected: "uint64",
                found: "int32"
            })
        );
        assert_eq!(
            write_value(&HASH, &XdrValue::Opaque(vec![1]), &mut w),
            Err(XdrError::WrongFixedLength {
                expected: 3,
                found: 1
            })
        );
        assert!(write_value(&SAMPLE, &XdrValue::Record(vec![]), &mut w).is_err());
    }

    #[test]
    fn min_size_accounts_for_every_field() {
        // Seven 4-byte fields (the optional one is just its flag) plus the
        // discriminant of the void arm.
        assert_eq!(SAMPLE.min_size(), 32);
        assert_eq!(HASH.min_size(), 4);
    }

    #[test]
    fn typed_conversions() {
        assert_eq!(u64::from_value(XdrValue::Uint64(3)).unwrap(), 3);
        assert_eq!(
            <[u8; 2]>::from_value(XdrValue::Opaque(vec![1, 2])).unwrap(),
            [1, 2]
        );
        assert!(<[u8; 2]>::from_value(XdrValue::Opaque(vec![1])).is_err());
        assert_eq!(
            Option::<bool>::from_value(XdrValue::Optional(None)).unwrap(),
            None
        );
        assert_eq!(
            Vec::<u32>::from_value(XdrValue::Array(vec![XdrValue::Uint32(4)])).unwrap(),
            vec![4]
        );
        assert!(i64::from_value(XdrValue::Uint64(1)).is_err());
    }

    #[test]
    fn field_cursor_reports_missing_and_extra_fields() {
        let mut fields = XdrValue::Record(vec![XdrValue::Bool(true)])
            .into_record("Tiny")
            .unwrap();
        assert!(fields.next::<bool>().unwrap());
        assert!(fields.next::<bool>().is_err());

        let mut fields = XdrValue::Record(vec![XdrValue::Bool(true), XdrValue::Bool(false)])
            .into_record("Tiny")
            .unwrap();
        fields.next::<bool>().unwrap();
        assert!(fields.finish().is_err());
    }
}
