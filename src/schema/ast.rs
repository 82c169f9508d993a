// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST types for parsed ROS 2 .msg schemas.

use std::collections::HashMap;

/// Package used for the unqualified `Header` type.
pub const HEADER_TYPE: &str = "std_msgs/msg/Header";

/// The types produced by parsing one definition text.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    /// Canonical name of the root type (e.g., "geometry_msgs/msg/PoseStamped")
    pub name: String,
    /// Root type and every dependency block, keyed by canonical name
    pub types: HashMap<String, MessageType>,
}

/// A message type definition with its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageType {
    /// Canonical type name
    pub name: String,
    /// Ordered list of fields (constants excluded)
    pub fields: Vec<Field>,
}

/// A field in a message type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field type
    pub type_name: FieldType,
}

/// Field type as declared in the .msg text.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Primitive type
    Primitive(PrimitiveType),
    /// Fixed-size array `T[N]`, serialized without a length prefix
    Array {
        /// Element type
        base_type: Box<FieldType>,
        /// Element count
        size: usize,
    },
    /// Sequence `T[]` or bounded sequence `T[<=N]`
    Sequence {
        /// Element type
        base_type: Box<FieldType>,
        /// Upper bound, if declared
        bound: Option<usize>,
    },
    /// Nested message type, always stored as a canonical name
    Nested(String),
}

/// Primitive ROS 2 types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Boolean
    Bool,
    /// Byte (octet)
    Byte,
    /// Char (octet in ROS 2)
    Char,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 8-bit unsigned integer
    UInt8,
    /// 16-bit unsigned integer
    UInt16,
    /// 32-bit unsigned integer
    UInt32,
    /// 64-bit unsigned integer
    UInt64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// UTF-8 string, possibly bounded
    String,
    /// Wide string (32-bit code units on the wire)
    WString,
}

impl PrimitiveType {
    /// Get the CDR alignment for this primitive type.
    pub fn alignment(self) -> usize {
        match self {
            PrimitiveType::Bool
            | PrimitiveType::Byte
            | PrimitiveType::Char
            | PrimitiveType::Int8
            | PrimitiveType::UInt8 => 1,
            PrimitiveType::Int16 | PrimitiveType::UInt16 => 2,
            PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float32 => 4,
            PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Float64 => 8,
            PrimitiveType::String | PrimitiveType::WString => 4, // Length prefix is 4-byte aligned
        }
    }

    /// Parse a primitive type from its .msg spelling.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "bool" => Some(PrimitiveType::Bool),
            "byte" => Some(PrimitiveType::Byte),
            "char" => Some(PrimitiveType::Char),
            "int8" => Some(PrimitiveType::Int8),
            "int16" => Some(PrimitiveType::Int16),
            "int32" => Some(PrimitiveType::Int32),
            "int64" => Some(PrimitiveType::Int64),
            "uint8" => Some(PrimitiveType::UInt8),
            "uint16" => Some(PrimitiveType::UInt16),
            "uint32" => Some(PrimitiveType::UInt32),
            "uint64" => Some(PrimitiveType::UInt64),
            "float32" => Some(PrimitiveType::Float32),
            "float64" => Some(PrimitiveType::Float64),
            "string" => Some(PrimitiveType::String),
            "wstring" => Some(PrimitiveType::WString),
            _ => None,
        }
    }
}

impl FieldType {
    /// Names of nested types referenced by this field, if any.
    pub fn nested_name(&self) -> Option<&str> {
        match self {
            FieldType::Nested(name) => Some(name),
            FieldType::Array { base_type, .. } | FieldType::Sequence { base_type, .. } => {
                base_type.nested_name()
            }
            FieldType::Primitive(_) => None,
        }
    }
}

impl MessageSchema {
    /// Create an empty schema rooted at `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: canonical_type_name(name),
            types: HashMap::new(),
        }
    }

    /// Register a type in this schema.
    pub fn add_type(&mut self, msg_type: MessageType) {
        self.types.insert(msg_type.name.clone(), msg_type);
    }

    /// Look up a type by any accepted spelling.
    pub fn get_type(&self, name: &str) -> Option<&MessageType> {
        self.types.get(&canonical_type_name(name))
    }

    /// The root type of this schema.
    pub fn root(&self) -> Option<&MessageType> {
        self.types.get(&self.name)
    }
}

impl MessageType {
    /// Create a new message type.
    pub fn new(name: String) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Add a field to this message type.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }
}

/// Normalize a type name to `pkg/msg/Type`.
///
/// Accepts `pkg/msg/Type`, `pkg/Type` and `pkg::msg::Type`. Names without a
/// package are returned unchanged.
pub fn canonical_type_name(name: &str) -> String {
    let name = name.trim().replace("::", "/");
    let parts: Vec<&str> = name.split('/').filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [pkg, ty] => format!("{pkg}/msg/{ty}"),
        _ => parts.join("/"),
    }
}

/// Package of a canonical type name.
pub fn package_of(name: &str) -> Option<&str> {
    name.split_once('/').map(|(pkg, _)| pkg)
}

/// Resolve a type reference found inside a message of package `package`.
pub fn resolve_nested_name(reference: &str, package: Option<&str>) -> String {
    if reference.contains('/') || reference.contains("::") {
        return canonical_type_name(reference);
    }
    if reference == "Header" {
        return HEADER_TYPE.to_string();
    }
    match package {
        Some(pkg) => format!("{pkg}/msg/{reference}"),
        None => reference.to_string(),
    }
}
