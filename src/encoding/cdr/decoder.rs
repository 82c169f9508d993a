// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR (Common Data Representation) decoder implementation.
//!
//! Decodes ROS 2 CDR payloads by walking the message type from the
//! [`MessageRegistry`], producing a [`DecodedMessage`] whose fields keep
//! their declared order and shape.

use std::collections::HashSet;

use crate::core::{BagError, CodecValue, DecodedMessage, FieldShape, Result};
use crate::io::traits::MessageDecoder;
use crate::schema::{canonical_type_name, FieldType, MessageRegistry, MessageType, PrimitiveType};

use super::cursor::CdrCursor;

/// Maximum allowed string or sequence length to prevent OOM attacks.
pub const MAX_LENGTH: usize = 10_000_000;

/// Schema-driven CDR decoder for ROS 2 messages.
///
/// Owns the registry it resolves types from. Types are loaded transitively
/// the first time they are decoded.
#[derive(Debug, Default)]
pub struct CdrDecoder {
    registry: MessageRegistry,
    loaded: HashSet<String>,
}

impl CdrDecoder {
    /// Create a decoder over an existing registry.
    pub fn new(registry: MessageRegistry) -> Self {
        Self {
            registry,
            loaded: HashSet::new(),
        }
    }

    /// The registry used for type lookups.
    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    /// Mutable access to the registry, e.g. to add embedded definitions.
    pub fn registry_mut(&mut self) -> &mut MessageRegistry {
        &mut self.registry
    }

    /// Decode a CDR-encoded message of type `type_name`.
    ///
    /// # Arguments
    ///
    /// * `data` - The CDR-encoded binary data (includes 4-byte header)
    /// * `type_name` - The type name to decode (any accepted spelling)
    pub fn decode(&mut self, data: &[u8], type_name: &str) -> Result<DecodedMessage> {
        let type_name = canonical_type_name(type_name);
        if !self.loaded.contains(&type_name) {
            self.registry.ensure_loaded(&type_name)?;
            self.loaded.insert(type_name.clone());
        }

        let mut cursor = CdrCursor::new(data)?;
        decode_message(&self.registry, &mut cursor, &type_name)
    }
}

impl MessageDecoder for CdrDecoder {
    fn add_definition(&mut self, type_name: &str, encoding: &str, definition: &str) {
        self.registry.add_definition(type_name, encoding, definition);
    }

    fn decode(&mut self, data: &[u8], type_name: &str) -> Result<DecodedMessage> {
        CdrDecoder::decode(self, data, type_name)
    }
}

fn lookup<'r>(registry: &'r MessageRegistry, type_name: &str) -> Result<&'r MessageType> {
    registry
        .get(type_name)
        .ok_or_else(|| BagError::type_not_found(type_name))
}

/// Decode one structure, fields in declaration order.
fn decode_message(
    registry: &MessageRegistry,
    cursor: &mut CdrCursor,
    type_name: &str,
) -> Result<DecodedMessage> {
    let msg_type = lookup(registry, type_name)?;
    let mut message = DecodedMessage::new(type_name);

    // Empty structures still occupy one byte on the wire
    if msg_type.fields.is_empty() {
        cursor.read_u8()?;
        return Ok(message);
    }

    for field in &msg_type.fields {
        let value = decode_field(registry, cursor, &field.type_name).map_err(|e| match e {
            BagError::FieldDecodeError { .. } => e,
            other => BagError::FieldDecodeError {
                field_name: field.name.clone(),
                type_name: type_name.to_string(),
                cause: other.to_string(),
            },
        })?;
        message.push(field.name.clone(), shape_of(&field.type_name), value);
    }

    Ok(message)
}

fn shape_of(field_type: &FieldType) -> FieldShape {
    match field_type {
        FieldType::Array { size, .. } => FieldShape::Array(*size),
        FieldType::Sequence { .. } => FieldShape::Sequence,
        FieldType::Primitive(_) | FieldType::Nested(_) => FieldShape::Single,
    }
}

fn decode_field(
    registry: &MessageRegistry,
    cursor: &mut CdrCursor,
    field_type: &FieldType,
) -> Result<CodecValue> {
    match field_type {
        FieldType::Primitive(prim) => read_primitive(cursor, *prim),
        FieldType::Nested(name) => Ok(CodecValue::Struct(decode_message(registry, cursor, name)?)),
        FieldType::Array { base_type, size } => read_elements(registry, cursor, base_type, *size),
        FieldType::Sequence { base_type, .. } => {
            let len = read_length(cursor)?;
            read_elements(registry, cursor, base_type, len)
        }
    }
}

fn read_elements(
    registry: &MessageRegistry,
    cursor: &mut CdrCursor,
    element: &FieldType,
    count: usize,
) -> Result<CodecValue> {
    let mut values = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        values.push(decode_field(registry, cursor, element)?);
    }
    Ok(CodecValue::Array(values))
}

/// Read a `u32` length prefix and bound-check it.
fn read_length(cursor: &mut CdrCursor) -> Result<usize> {
    let len = cursor.read_u32()? as usize;
    if len > MAX_LENGTH {
        return Err(BagError::length_exceeded(len, MAX_LENGTH));
    }
    Ok(len)
}

/// Read a primitive value.
fn read_primitive(cursor: &mut CdrCursor, prim: PrimitiveType) -> Result<CodecValue> {
    Ok(match prim {
        PrimitiveType::Bool => CodecValue::Bool(cursor.read_u8()? != 0),
        PrimitiveType::Byte | PrimitiveType::Char | PrimitiveType::UInt8 => {
            CodecValue::UInt8(cursor.read_u8()?)
        }
        PrimitiveType::Int8 => CodecValue::Int8(cursor.read_i8()?),
        PrimitiveType::Int16 => CodecValue::Int16(cursor.read_i16()?),
        PrimitiveType::Int32 => CodecValue::Int32(cursor.read_i32()?),
        PrimitiveType::Int64 => CodecValue::Int64(cursor.read_i64()?),
        PrimitiveType::UInt16 => CodecValue::UInt16(cursor.read_u16()?),
        PrimitiveType::UInt32 => CodecValue::UInt32(cursor.read_u32()?),
        PrimitiveType::UInt64 => CodecValue::UInt64(cursor.read_u64()?),
        PrimitiveType::Float32 => CodecValue::Float32(cursor.read_f32()?),
        PrimitiveType::Float64 => CodecValue::Float64(cursor.read_f64()?),
        PrimitiveType::String => CodecValue::String(read_string(cursor)?),
        PrimitiveType::WString => CodecValue::String(read_wstring(cursor)?),
    })
}

/// Read a string: `u32` length including the NUL terminator, then bytes.
fn read_string(cursor: &mut CdrCursor) -> Result<String> {
    let len = read_length(cursor)?;

    if len <= 1 {
        // Empty string (length 0 or 1 for just null terminator)
        cursor.skip(len)?;
        return Ok(String::new());
    }

    let bytes = cursor.read_bytes(len)?;
    let text = bytes.strip_suffix(&[0]).unwrap_or(bytes);
    Ok(String::from_utf8_lossy(text).into_owned())
}

/// Read a wide string: `u32` count of 32-bit code units.
fn read_wstring(cursor: &mut CdrCursor) -> Result<String> {
    let len = read_length(cursor)?;
    let mut text = String::with_capacity(len);
    for _ in 0..len {
        let unit = cursor.read_u32()?;
        if unit == 0 {
            continue;
        }
        text.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

    fn decoder_for(type_name: &str, definition: &str) -> CdrDecoder {
        let mut registry = MessageRegistry::new();
        registry.add_definition(type_name, "ros2msg", definition);
        CdrDecoder::new(registry)
    }

    fn push_string(data: &mut Vec<u8>, s: &str) {
        while (data.len() - 4) % 4 != 0 {
            data.push(0);
        }
        data.extend_from_slice(&((s.len() + 1) as u32).to_le_bytes());
        data.extend_from_slice(s.as_bytes());
        data.push(0);
    }

    #[test]
    fn test_decode_int32() {
        let mut decoder = decoder_for("test_msgs/msg/Value", "int32 value");
        let mut data = HEADER.to_vec();
        data.extend_from_slice(&42i32.to_le_bytes());

        let result = decoder.decode(&data, "test_msgs/Value").unwrap();
        assert_eq!(result.type_name, "test_msgs/msg/Value");
        assert_eq!(result.get("value"), Some(&CodecValue::Int32(42)));
    }

    #[test]
    fn test_decode_keeps_declared_order() {
        let mut decoder = decoder_for("test_msgs/msg/Mixed", "uint8 flag\nfloat64 x\nstring name");
        let mut data = HEADER.to_vec();
        data.push(1);
        data.extend_from_slice(&[0; 7]); // pad to 8
        data.extend_from_slice(&0.5f64.to_le_bytes());
        push_string(&mut data, "base_link");

        let result = decoder.decode(&data, "test_msgs/msg/Mixed").unwrap();
        let names: Vec<&str> = result.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["flag", "x", "name"]);
        assert_eq!(result.get("x"), Some(&CodecValue::Float64(0.5)));
        assert_eq!(
            result.get("name"),
            Some(&CodecValue::String("base_link".to_string()))
        );
    }

    #[test]
    fn test_decode_empty_string() {
        let mut decoder = decoder_for("test_msgs/msg/Text", "string data\nuint8 after");
        let mut data = HEADER.to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.push(0);
        data.push(9);

        let result = decoder.decode(&data, "test_msgs/msg/Text").unwrap();
        assert_eq!(result.get("data"), Some(&CodecValue::String(String::new())));
        assert_eq!(result.get("after"), Some(&CodecValue::UInt8(9)));
    }

    #[test]
    fn test_decode_sequence_and_fixed_array() {
        let mut decoder = decoder_for(
            "test_msgs/msg/Arrays",
            "int32[] values\nfloat32[3] position",
        );
        let mut data = HEADER.to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&2i32.to_le_bytes());
        for v in [1.0f32, 2.0, 3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let result = decoder.decode(&data, "test_msgs/msg/Arrays").unwrap();
        assert_eq!(result.fields[0].shape, FieldShape::Sequence);
        assert_eq!(
            result.get("values"),
            Some(&CodecValue::Array(vec![
                CodecValue::Int32(1),
                CodecValue::Int32(2)
            ]))
        );
        assert_eq!(result.fields[1].shape, FieldShape::Array(3));
        assert_eq!(result.get("position").unwrap().as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_decode_nested_header_with_builtin_types() {
        let mut decoder = decoder_for(
            "geometry_msgs/msg/PointStamped",
            "std_msgs/Header header\nfloat64 x",
        );
        let mut data = HEADER.to_vec();
        data.extend_from_slice(&12i32.to_le_bytes()); // sec
        data.extend_from_slice(&500u32.to_le_bytes()); // nanosec
        push_string(&mut data, "map");
        while (data.len() - 4) % 8 != 0 {
            data.push(0);
        }
        data.extend_from_slice(&1.5f64.to_le_bytes());

        let result = decoder.decode(&data, "geometry_msgs/msg/PointStamped").unwrap();
        let header = result.get("header").unwrap().as_struct().unwrap();
        let stamp = header.get("stamp").unwrap().as_struct().unwrap();
        assert_eq!(stamp.get("sec"), Some(&CodecValue::Int32(12)));
        assert_eq!(stamp.get("nanosec"), Some(&CodecValue::UInt32(500)));
        assert_eq!(header.get("frame_id").unwrap().as_str(), Some("map"));
        assert_eq!(result.get("x"), Some(&CodecValue::Float64(1.5)));
    }

    #[test]
    fn test_decode_sequence_of_structs() {
        let mut decoder = decoder_for(
            "test_msgs/msg/Cloud",
            "Point[] points\n===\nMSG: test_msgs/Point\nfloat32 x\nfloat32 y",
        );
        let mut data = HEADER.to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        for v in [1.0f32, 2.0, 3.0, 4.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let result = decoder.decode(&data, "test_msgs/msg/Cloud").unwrap();
        let points = result.get("points").unwrap().as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[1].as_struct().unwrap().get("y"),
            Some(&CodecValue::Float32(4.0))
        );
    }

    #[test]
    fn test_decode_empty_struct_consumes_one_byte() {
        let mut decoder = decoder_for(
            "test_msgs/msg/Wrapper",
            "Empty nothing\nuint8 value\n===\nMSG: test_msgs/Empty\n",
        );
        let mut data = HEADER.to_vec();
        data.push(0); // empty struct padding byte
        data.push(7);

        let result = decoder.decode(&data, "test_msgs/msg/Wrapper").unwrap();
        assert!(result.get("nothing").unwrap().as_struct().unwrap().is_empty());
        assert_eq!(result.get("value"), Some(&CodecValue::UInt8(7)));
    }

    #[test]
    fn test_decode_wstring() {
        let mut decoder = decoder_for("test_msgs/msg/Wide", "wstring text");
        let mut data = HEADER.to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&('h' as u32).to_le_bytes());
        data.extend_from_slice(&('é' as u32).to_le_bytes());

        let result = decoder.decode(&data, "test_msgs/msg/Wide").unwrap();
        assert_eq!(result.get("text").unwrap().as_str(), Some("hé"));
    }

    #[test]
    fn test_decode_sequence_too_long() {
        let mut decoder = decoder_for("test_msgs/msg/Values", "int32[] values");
        let mut data = HEADER.to_vec();
        data.extend_from_slice(&u32::MAX.to_le_bytes());

        let err = decoder.decode(&data, "test_msgs/msg/Values").unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"), "{err}");
    }

    #[test]
    fn test_decode_truncated_buffer() {
        let mut decoder = decoder_for("test_msgs/msg/Pair", "int32 a\nint64 b");
        let mut data = HEADER.to_vec();
        data.extend_from_slice(&1i32.to_le_bytes());

        let err = decoder.decode(&data, "test_msgs/msg/Pair").unwrap_err();
        match err {
            BagError::FieldDecodeError {
                field_name, cause, ..
            } => {
                assert_eq!(field_name, "b");
                assert!(cause.contains("Buffer too short"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_unknown_type() {
        let mut decoder = CdrDecoder::default();
        let err = decoder.decode(&HEADER, "nope_msgs/msg/Missing").unwrap_err();
        assert!(matches!(err, BagError::TypeNotFound { .. }));
    }
}
