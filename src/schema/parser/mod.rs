// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parser implementations.

pub mod msg_parser;

use crate::core::{BagError, Result};
use crate::schema::MessageSchema;

/// Encoding name rosbag2 uses for `.msg` text definitions.
pub const ROS2MSG_ENCODING: &str = "ros2msg";

/// Parse a `.msg` schema from a string.
///
/// # Arguments
///
/// * `name` - Message type name (any accepted spelling)
/// * `definition` - Schema definition string
pub fn parse_schema(name: &str, definition: &str) -> Result<MessageSchema> {
    msg_parser::parse(name, definition)
}

/// Parse a schema given its encoding name (e.g., "ros2msg").
///
/// Only `ros2msg` is understood; other encodings (for example `ros2idl`)
/// are reported as unsupported.
pub fn parse_schema_with_encoding_str(
    name: &str,
    definition: &str,
    encoding: &str,
) -> Result<MessageSchema> {
    if encoding.eq_ignore_ascii_case(ROS2MSG_ENCODING) {
        parse_schema(name, definition)
    } else {
        Err(BagError::unsupported(format!(
            "message definition encoding '{encoding}' for {name}"
        )))
    }
}
