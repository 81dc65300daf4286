// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `Variant` and its `Array`.

use std::fmt;

use crate::{
    codec::{DecodeStream, EncodeStream},
    types::{
        byte_string::ByteString,
        data_value::DataValue,
        date_time::DateTime,
        diagnostic_info::DiagnosticInfo,
        encoding::*,
        expanded_node_id::ExpandedNodeId,
        extension_object::ExtensionObject,
        guid::Guid,
        localized_text::LocalizedText,
        node_id::NodeId,
        qualified_name::QualifiedName,
        status_code::StatusCode,
        string::{UAString, XmlElement},
        variant_type_id::{EncodingMask, VariantTypeId},
    },
};

/// A `Variant` holds built-in OPC UA data types, including single and multi dimensional arrays,
/// data values and extension objects.
///
/// As variants may be passed around a lot on the stack, Boxes are used for more complex types to
/// keep the size of this type down a bit, especially when used in arrays.
#[derive(PartialEq, Debug, Clone)]
pub enum Variant {
    /// Empty type has no value. It is equivalent to a Null value (part 6 5.1.6)
    Empty,
    Boolean(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(UAString),
    DateTime(Box<DateTime>),
    Guid(Box<Guid>),
    StatusCode(StatusCode),
    ByteString(ByteString),
    XmlElement(XmlElement),
    QualifiedName(Box<QualifiedName>),
    LocalizedText(Box<LocalizedText>),
    NodeId(Box<NodeId>),
    ExpandedNodeId(Box<ExpandedNodeId>),
    ExtensionObject(Box<ExtensionObject>),
    /// A variant inside a variant, only valid as an element of an array of variants
    Variant(Box<Variant>),
    DataValue(Box<DataValue>),
    Diagnostics(Box<DiagnosticInfo>),
    /// Single or multi dimensional array whose values are all of one type. Arrays of arrays are
    /// rejected.
    Array(Box<Array>),
}

/// An array of variant values of one type, optionally with dimensions.
#[derive(PartialEq, Debug, Clone)]
pub struct Array {
    /// Type of the values
    pub value_type: VariantTypeId,
    /// The values, in row order for a multi dimensional array. `None` is a null array, which is
    /// distinct from an empty one on the wire.
    pub values: Option<Vec<Variant>>,
    /// Length of each dimension, empty for a single dimension array
    pub dimensions: Vec<u32>,
}

impl Array {
    /// Creates a single dimension array. Every value must be of `value_type`.
    pub fn new<V>(value_type: VariantTypeId, values: V) -> EncodingResult<Array>
    where
        V: Into<Vec<Variant>>,
    {
        Self::new_multi(value_type, values, Vec::new())
    }

    /// Creates a multi dimensional array. The product of the dimensions must equal the number of
    /// values.
    pub fn new_multi<V>(
        value_type: VariantTypeId,
        values: V,
        dimensions: Vec<u32>,
    ) -> EncodingResult<Array>
    where
        V: Into<Vec<Variant>>,
    {
        let array = Array {
            value_type,
            values: Some(values.into()),
            dimensions,
        };
        array.validate()?;
        Ok(array)
    }

    /// Creates a null array of the given type
    pub fn null(value_type: VariantTypeId) -> EncodingResult<Array> {
        let array = Array {
            value_type,
            values: None,
            dimensions: Vec::new(),
        };
        array.validate()?;
        Ok(array)
    }

    pub fn is_null(&self) -> bool {
        self.values.is_none()
    }

    /// The values of the array, empty for a null array
    pub fn values(&self) -> &[Variant] {
        self.values.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Checks the values are all of the array's type and that the dimensions match them.
    pub fn validate(&self) -> EncodingResult<()> {
        if self.value_type == VariantTypeId::Empty {
            return Err(EncodingError::unsupported_value(
                "array values must have a type",
            ));
        }
        let values = self.values();
        if let Some(i) = values
            .iter()
            .position(|v| v.is_array() || v.type_id() != self.value_type)
        {
            return Err(EncodingError::unsupported_value(format!(
                "array of {:?} holds a value of type {:?}",
                self.value_type,
                values[i].type_id()
            ))
            .at_index(i));
        }
        if !self.dimensions.is_empty() {
            if self.is_null() {
                return Err(EncodingError::unsupported_value(
                    "a null array cannot have dimensions",
                ));
            }
            let len = self
                .dimensions
                .iter()
                .try_fold(1usize, |len, d| len.checked_mul(*d as usize));
            if len != Some(values.len()) {
                return Err(EncodingError::unsupported_value(format!(
                    "array dimensions {:?} do not match {} values",
                    self.dimensions,
                    values.len()
                )));
            }
        }
        Ok(())
    }

    fn encoding_mask(&self) -> u8 {
        let mut encoding_mask = self.value_type.encoding_mask() | EncodingMask::ARRAY_VALUES_BIT;
        if !self.dimensions.is_empty() {
            encoding_mask |= EncodingMask::ARRAY_DIMENSIONS_BIT;
        }
        encoding_mask
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Empty => write!(f, "[empty]"),
            Variant::Boolean(v) => write!(f, "{}", v),
            Variant::SByte(v) => write!(f, "{}", v),
            Variant::Byte(v) => write!(f, "{}", v),
            Variant::Int16(v) => write!(f, "{}", v),
            Variant::UInt16(v) => write!(f, "{}", v),
            Variant::Int32(v) => write!(f, "{}", v),
            Variant::UInt32(v) => write!(f, "{}", v),
            Variant::Int64(v) => write!(f, "{}", v),
            Variant::UInt64(v) => write!(f, "{}", v),
            Variant::Float(v) => write!(f, "{}", v),
            Variant::Double(v) => write!(f, "{}", v),
            Variant::String(v) => write!(f, "{}", v),
            Variant::DateTime(v) => write!(f, "{}", v),
            Variant::Guid(v) => write!(f, "{}", v),
            Variant::StatusCode(v) => write!(f, "{}", v),
            Variant::ByteString(v) => write!(f, "{}", v.as_base64()),
            Variant::XmlElement(v) => write!(f, "{}", v),
            Variant::QualifiedName(v) => write!(f, "{}", v),
            Variant::LocalizedText(v) => write!(f, "{}", v),
            Variant::NodeId(v) => write!(f, "{}", v),
            Variant::ExpandedNodeId(v) => write!(f, "{}", v),
            Variant::ExtensionObject(v) => write!(f, "{}", v),
            Variant::Variant(v) => write!(f, "Variant({})", v),
            Variant::DataValue(v) => write!(f, "{:?}", v),
            Variant::Diagnostics(v) => write!(f, "{:?}", v),
            Variant::Array(v) => write!(f, "Array({:?}, {} values)", v.value_type, v.len()),
        }
    }
}

impl BinaryEncoder<Variant> for Variant {
    fn encode(&self, stream: &mut EncodeStream<'_>) -> EncodingResult<usize> {
        let mut size: usize = 0;

        // Encoding mask will include the array bits if applicable for the type
        let encoding_mask = self.encoding_mask();
        size += write_u8(stream, encoding_mask)?;

        if let Variant::Array(array) = self {
            array.validate()?;
            match array.values {
                Some(ref values) => {
                    size += write_length(stream, values.len())?;
                    for (i, value) in values.iter().enumerate() {
                        size +=
                            Self::encode_variant_value(stream, value).map_err(|e| e.at_index(i))?;
                    }
                }
                None => size += write_i32(stream, -1)?,
            }
            if !array.dimensions.is_empty() {
                size += write_length(stream, array.dimensions.len())?;
                for dimension in &array.dimensions {
                    if *dimension > i32::MAX as u32 {
                        return Err(EncodingError::unsupported_value(format!(
                            "array dimension {} is too large",
                            dimension
                        )));
                    }
                    size += write_i32(stream, *dimension as i32)?;
                }
            }
        } else {
            size += Self::encode_variant_value(stream, self)?;
        }

        Ok(size)
    }

    fn decode(stream: &mut DecodeStream<'_>) -> EncodingResult<Self> {
        let encoding_mask = read_u8(stream)?;
        let element_type = VariantTypeId::from_encoding_mask(encoding_mask)?;

        if encoding_mask & EncodingMask::ARRAY_VALUES_BIT != 0 {
            if element_type == VariantTypeId::Empty {
                error!("Variant array has no element type");
                return Err(EncodingError::decoding("array of empty values"));
            }
            let max_array_length = stream.decoding_options().max_array_length;
            let values = match read_length(stream, max_array_length, "Variant array")? {
                None => None,
                Some(len) => {
                    let mut values = Vec::with_capacity(len.min(stream.remaining()));
                    for i in 0..len {
                        values.push(
                            Self::decode_variant_value(stream, element_type)
                                .map_err(|e| e.at_index(i))?,
                        );
                    }
                    Some(values)
                }
            };
            let dimensions = if encoding_mask & EncodingMask::ARRAY_DIMENSIONS_BIT != 0 {
                let len = values.as_ref().map(Vec::len).unwrap_or_default();
                Self::decode_dimensions(stream, len)?
            } else {
                Vec::new()
            };
            Ok(Variant::Array(Box::new(Array {
                value_type: element_type,
                values,
                dimensions,
            })))
        } else if encoding_mask & EncodingMask::ARRAY_DIMENSIONS_BIT != 0 {
            error!("Array dimensions bit specified without any values");
            Err(EncodingError::decoding(
                "array dimensions without array values",
            ))
        } else {
            Self::decode_variant_value(stream, element_type)
        }
    }
}

crate::impl_override!(Variant);

impl Default for Variant {
    fn default() -> Self {
        Variant::Empty
    }
}

macro_rules! variant_from {
    ( $( $t:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$t> for Variant {
                fn from(v: $t) -> Self {
                    Variant::$variant(v.into())
                }
            }
        )*
    };
}

variant_from! {
    bool => Boolean,
    i8 => SByte,
    u8 => Byte,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    UAString => String,
    String => String,
    &str => String,
    DateTime => DateTime,
    Guid => Guid,
    StatusCode => StatusCode,
    ByteString => ByteString,
    QualifiedName => QualifiedName,
    LocalizedText => LocalizedText,
    NodeId => NodeId,
    ExpandedNodeId => ExpandedNodeId,
    ExtensionObject => ExtensionObject,
    DataValue => DataValue,
    DiagnosticInfo => Diagnostics,
    Array => Array,
}

impl Variant {
    /// Returns the type of the variant, or the type of its values for an array
    pub fn type_id(&self) -> VariantTypeId {
        match self {
            Variant::Empty => VariantTypeId::Empty,
            Variant::Boolean(_) => VariantTypeId::Boolean,
            Variant::SByte(_) => VariantTypeId::SByte,
            Variant::Byte(_) => VariantTypeId::Byte,
            Variant::Int16(_) => VariantTypeId::Int16,
            Variant::UInt16(_) => VariantTypeId::UInt16,
            Variant::Int32(_) => VariantTypeId::Int32,
            Variant::UInt32(_) => VariantTypeId::UInt32,
            Variant::Int64(_) => VariantTypeId::Int64,
            Variant::UInt64(_) => VariantTypeId::UInt64,
            Variant::Float(_) => VariantTypeId::Float,
            Variant::Double(_) => VariantTypeId::Double,
            Variant::String(_) => VariantTypeId::String,
            Variant::DateTime(_) => VariantTypeId::DateTime,
            Variant::Guid(_) => VariantTypeId::Guid,
            Variant::StatusCode(_) => VariantTypeId::StatusCode,
            Variant::ByteString(_) => VariantTypeId::ByteString,
            Variant::XmlElement(_) => VariantTypeId::XmlElement,
            Variant::QualifiedName(_) => VariantTypeId::QualifiedName,
            Variant::LocalizedText(_) => VariantTypeId::LocalizedText,
            Variant::NodeId(_) => VariantTypeId::NodeId,
            Variant::ExpandedNodeId(_) => VariantTypeId::ExpandedNodeId,
            Variant::ExtensionObject(_) => VariantTypeId::ExtensionObject,
            Variant::Variant(_) => VariantTypeId::Variant,
            Variant::DataValue(_) => VariantTypeId::DataValue,
            Variant::Diagnostics(_) => VariantTypeId::Diagnostic,
            Variant::Array(array) => array.value_type,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Variant::Array(_))
    }

    pub fn is_numeric(&self) -> bool {
        !self.is_array() && self.type_id().is_numeric()
    }

    /// Returns the encoding byte of the variant, including the array bits for an array
    pub fn encoding_mask(&self) -> u8 {
        match self {
            Variant::Array(array) => array.encoding_mask(),
            _ => self.type_id().encoding_mask(),
        }
    }

    /// Writes the value of a scalar variant without its encoding byte.
    fn encode_variant_value(stream: &mut EncodeStream<'_>, value: &Variant) -> EncodingResult<usize> {
        match value {
            Variant::Empty => Ok(0),
            Variant::Boolean(v) => v.encode(stream),
            Variant::SByte(v) => v.encode(stream),
            Variant::Byte(v) => v.encode(stream),
            Variant::Int16(v) => v.encode(stream),
            Variant::UInt16(v) => v.encode(stream),
            Variant::Int32(v) => v.encode(stream),
            Variant::UInt32(v) => v.encode(stream),
            Variant::Int64(v) => v.encode(stream),
            Variant::UInt64(v) => v.encode(stream),
            Variant::Float(v) => v.encode(stream),
            Variant::Double(v) => v.encode(stream),
            Variant::String(v) => v.encode(stream),
            Variant::DateTime(v) => v.encode(stream),
            Variant::Guid(v) => v.encode(stream),
            Variant::StatusCode(v) => v.encode(stream),
            Variant::ByteString(v) => v.encode(stream),
            Variant::XmlElement(v) => v.encode(stream),
            Variant::QualifiedName(v) => {
                // A qualified name is a plain structure so it goes through its plan
                let start = stream.position();
                stream.encode_value::<QualifiedName>(v)?;
                Ok(stream.position() - start)
            }
            Variant::LocalizedText(v) => v.encode(stream),
            Variant::NodeId(v) => v.encode(stream),
            Variant::ExpandedNodeId(v) => v.encode(stream),
            Variant::ExtensionObject(v) => v.encode(stream),
            Variant::Variant(v) => stream.descend(|stream| v.encode(stream)),
            Variant::DataValue(v) => stream.descend(|stream| v.encode(stream)),
            Variant::Diagnostics(v) => stream.descend(|stream| v.encode(stream)),
            Variant::Array(_) => {
                error!("Arrays of arrays cannot be encoded in a variant");
                Err(EncodingError::unsupported_value(
                    "array cannot hold another array",
                ))
            }
        }
    }

    /// Reads the value of a scalar of the given type. Types which can nest a variant are read one
    /// level deeper.
    fn decode_variant_value(
        stream: &mut DecodeStream<'_>,
        variant_type: VariantTypeId,
    ) -> EncodingResult<Variant> {
        let value = match variant_type {
            VariantTypeId::Empty => Variant::Empty,
            VariantTypeId::Boolean => Variant::Boolean(bool::decode(stream)?),
            VariantTypeId::SByte => Variant::SByte(i8::decode(stream)?),
            VariantTypeId::Byte => Variant::Byte(u8::decode(stream)?),
            VariantTypeId::Int16 => Variant::Int16(i16::decode(stream)?),
            VariantTypeId::UInt16 => Variant::UInt16(u16::decode(stream)?),
            VariantTypeId::Int32 => Variant::Int32(i32::decode(stream)?),
            VariantTypeId::UInt32 => Variant::UInt32(u32::decode(stream)?),
            VariantTypeId::Int64 => Variant::Int64(i64::decode(stream)?),
            VariantTypeId::UInt64 => Variant::UInt64(u64::decode(stream)?),
            VariantTypeId::Float => Variant::Float(f32::decode(stream)?),
            VariantTypeId::Double => Variant::Double(f64::decode(stream)?),
            VariantTypeId::String => Variant::String(UAString::decode(stream)?),
            VariantTypeId::DateTime => Variant::from(DateTime::decode(stream)?),
            VariantTypeId::Guid => Variant::from(Guid::decode(stream)?),
            VariantTypeId::StatusCode => Variant::StatusCode(StatusCode::decode(stream)?),
            VariantTypeId::ByteString => Variant::ByteString(ByteString::decode(stream)?),
            VariantTypeId::XmlElement => Variant::XmlElement(XmlElement::decode(stream)?),
            VariantTypeId::QualifiedName => {
                Variant::from(stream.decode_value::<QualifiedName>()?)
            }
            VariantTypeId::LocalizedText => Variant::from(LocalizedText::decode(stream)?),
            VariantTypeId::NodeId => Variant::from(NodeId::decode(stream)?),
            VariantTypeId::ExpandedNodeId => Variant::from(ExpandedNodeId::decode(stream)?),
            VariantTypeId::ExtensionObject => Variant::from(ExtensionObject::decode(stream)?),
            VariantTypeId::Variant => {
                Variant::Variant(Box::new(stream.descend(Variant::decode)?))
            }
            VariantTypeId::DataValue => Variant::from(stream.descend(DataValue::decode)?),
            VariantTypeId::Diagnostic => Variant::from(stream.descend(DiagnosticInfo::decode)?),
        };
        Ok(value)
    }

    fn decode_dimensions(stream: &mut DecodeStream<'_>, len: usize) -> EncodingResult<Vec<u32>> {
        let dimensions = match read_array::<i32>(stream)? {
            Some(dimensions) if !dimensions.is_empty() => dimensions,
            _ => {
                error!("Array dimensions bit specified without any dimensions");
                return Err(EncodingError::decoding("array has no dimensions"));
            }
        };
        if let Some(dimension) = dimensions.iter().find(|d| **d <= 0) {
            error!("Invalid array dimension {}", dimension);
            return Err(EncodingError::decoding(format!(
                "invalid array dimension {}",
                dimension
            )));
        }
        let expected = dimensions
            .iter()
            .try_fold(1usize, |acc, d| acc.checked_mul(*d as usize));
        if expected != Some(len) {
            error!(
                "Array dimensions {:?} do not match the array length {}",
                dimensions, len
            );
            return Err(EncodingError::decoding(format!(
                "array dimensions {:?} do not match {} values",
                dimensions, len
            )));
        }
        Ok(dimensions.into_iter().map(|d| d as u32).collect())
    }
}
