// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoded message value model.
//!
//! A decoded message keeps its fields in declared order together with the
//! shape each field was declared with, so that flattening can reproduce the
//! schema's column order exactly. All variants are serde-serializable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared shape of a message field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldShape {
    /// A single scalar or nested message
    Single,
    /// Fixed-size array (`T[N]`)
    Array(usize),
    /// Variable-length sequence (`T[]` or `T[<=N]`)
    Sequence,
}

impl FieldShape {
    /// Check if the field was declared as an array or a sequence.
    pub fn is_collection(self) -> bool {
        matches!(self, FieldShape::Array(_) | FieldShape::Sequence)
    }
}

/// One field of a decoded message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedField {
    /// Field name as declared in the schema
    pub name: String,
    /// Declared shape
    pub shape: FieldShape,
    /// Decoded value
    pub value: CodecValue,
}

/// A decoded structured message with fields in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecodedMessage {
    /// Fully-qualified type name (e.g. "geometry_msgs/msg/Pose")
    pub type_name: String,
    /// Fields in declaration order
    pub fields: Vec<DecodedField>,
}

impl DecodedMessage {
    /// Create an empty message of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a single-valued field.
    pub fn with_field(mut self, name: impl Into<String>, value: CodecValue) -> Self {
        self.push(name, FieldShape::Single, value);
        self
    }

    /// Append a variable-length sequence field.
    pub fn with_sequence(mut self, name: impl Into<String>, items: Vec<CodecValue>) -> Self {
        self.push(name, FieldShape::Sequence, CodecValue::Array(items));
        self
    }

    /// Append a field with an explicit shape.
    pub fn push(&mut self, name: impl Into<String>, shape: FieldShape, value: CodecValue) {
        self.fields.push(DecodedField {
            name: name.into(),
            shape,
            value,
        });
    }

    /// Look up a field value by name.
    pub fn get(&self, name: &str) -> Option<&CodecValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the message has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Value decoded from a ROS 2 CDR payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CodecValue {
    // Boolean
    Bool(bool),

    // Signed integers
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    // Unsigned integers (byte and char decode as UInt8)
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),

    // Floating point
    Float32(f32),
    Float64(f64),

    // String (UTF-8; wstring is converted)
    String(String),

    // Fixed array or sequence
    Array(Vec<CodecValue>),

    // Nested message
    Struct(DecodedMessage),
}

impl CodecValue {
    /// Try to convert this value to f64 (for numeric values only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CodecValue::Int8(v) => Some(*v as f64),
            CodecValue::Int16(v) => Some(*v as f64),
            CodecValue::Int32(v) => Some(*v as f64),
            CodecValue::Int64(v) => Some(*v as f64),
            CodecValue::UInt8(v) => Some(*v as f64),
            CodecValue::UInt16(v) => Some(*v as f64),
            CodecValue::UInt32(v) => Some(*v as f64),
            CodecValue::UInt64(v) => Some(*v as f64),
            CodecValue::Float32(v) => Some(*v as f64),
            CodecValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CodecValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner struct.
    pub fn as_struct(&self) -> Option<&DecodedMessage> {
        match self {
            CodecValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner array.
    pub fn as_array(&self) -> Option<&[CodecValue]> {
        match self {
            CodecValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            CodecValue::Bool(_) => "bool",
            CodecValue::Int8(_) => "int8",
            CodecValue::Int16(_) => "int16",
            CodecValue::Int32(_) => "int32",
            CodecValue::Int64(_) => "int64",
            CodecValue::UInt8(_) => "uint8",
            CodecValue::UInt16(_) => "uint16",
            CodecValue::UInt32(_) => "uint32",
            CodecValue::UInt64(_) => "uint64",
            CodecValue::Float32(_) => "float32",
            CodecValue::Float64(_) => "float64",
            CodecValue::String(_) => "string",
            CodecValue::Array(_) => "array",
            CodecValue::Struct(_) => "struct",
        }
    }
}

/// Write a float in shortest round-trip form, always with a fractional part
/// or exponent (`1.0`, `0.25`, `1.5e-05`, `1e+16`).
///
/// Exponents carry an explicit sign and at least two digits; NaN is `nan`.
pub fn write_float(f: &mut impl fmt::Write, value: f64) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("nan");
    }

    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            write!(f, "{mantissa}e{sign}{digits:0>2}")
        }
        None => f.write_str(&text),
    }
}

/// CSV cell text for a value.
impl fmt::Display for CodecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecValue::Bool(true) => f.write_str("True"),
            CodecValue::Bool(false) => f.write_str("False"),
            CodecValue::Int8(v) => write!(f, "{v}"),
            CodecValue::Int16(v) => write!(f, "{v}"),
            CodecValue::Int32(v) => write!(f, "{v}"),
            CodecValue::Int64(v) => write!(f, "{v}"),
            CodecValue::UInt8(v) => write!(f, "{v}"),
            CodecValue::UInt16(v) => write!(f, "{v}"),
            CodecValue::UInt32(v) => write!(f, "{v}"),
            CodecValue::UInt64(v) => write!(f, "{v}"),
            // f32 is widened first so 0.1f32 prints as 0.10000000149011612
            CodecValue::Float32(v) => write_float(f, *v as f64),
            CodecValue::Float64(v) => write_float(f, *v),
            CodecValue::String(v) => f.write_str(v),
            CodecValue::Array(v) => write!(f, "[{} elements]", v.len()),
            CodecValue::Struct(v) => write!(f, "{{{} fields}}", v.len()),
        }
    }
}
