// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Predefined ROS 2 builtin message types.
//!
//! These are the last resort when neither the bag nor any search directory
//! provides a definition.
//!
//! ## Supported Types
//!
//! - `builtin_interfaces/msg/Time` - Timestamp with seconds and nanoseconds
//! - `builtin_interfaces/msg/Duration` - Time duration with seconds and nanoseconds
//! - `std_msgs/msg/Header` - Standard ROS message header with stamp, frame_id
//!
//! Time and Duration have the same structure:
//! ```text
//! int32 sec
//! uint32 nanosec
//! ```

use crate::schema::ast::{Field, FieldType, MessageType, PrimitiveType, HEADER_TYPE};

/// Canonical name of `builtin_interfaces/msg/Time`.
pub const TIME_TYPE: &str = "builtin_interfaces/msg/Time";

/// Canonical name of `builtin_interfaces/msg/Duration`.
pub const DURATION_TYPE: &str = "builtin_interfaces/msg/Duration";

fn sec_nanosec(name: &str) -> MessageType {
    let mut msg_type = MessageType::new(name.to_string());

    msg_type.add_field(Field {
        name: "sec".to_string(),
        type_name: FieldType::Primitive(PrimitiveType::Int32),
    });

    msg_type.add_field(Field {
        name: "nanosec".to_string(),
        type_name: FieldType::Primitive(PrimitiveType::UInt32),
    });

    msg_type
}

/// Create the predefined std_msgs/msg/Header type.
fn builtin_header() -> MessageType {
    let mut msg_type = MessageType::new(HEADER_TYPE.to_string());

    msg_type.add_field(Field {
        name: "stamp".to_string(),
        type_name: FieldType::Nested(TIME_TYPE.to_string()),
    });

    msg_type.add_field(Field {
        name: "frame_id".to_string(),
        type_name: FieldType::Primitive(PrimitiveType::String),
    });

    msg_type
}

/// Look up a builtin type by canonical name.
pub fn get(name: &str) -> Option<MessageType> {
    match name {
        TIME_TYPE | DURATION_TYPE => Some(sec_nanosec(name)),
        HEADER_TYPE => Some(builtin_header()),
        _ => None,
    }
}

/// Get all predefined builtin message types.
pub fn get_all() -> Vec<MessageType> {
    vec![
        sec_nanosec(TIME_TYPE),
        sec_nanosec(DURATION_TYPE),
        builtin_header(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_time_structure() {
        let time = get(TIME_TYPE).unwrap();

        assert_eq!(time.name, "builtin_interfaces/msg/Time");
        assert_eq!(time.fields.len(), 2);
        assert_eq!(time.fields[0].name, "sec");
        assert_eq!(time.fields[1].name, "nanosec");
        assert!(matches!(
            time.fields[0].type_name,
            FieldType::Primitive(PrimitiveType::Int32)
        ));
        assert!(matches!(
            time.fields[1].type_name,
            FieldType::Primitive(PrimitiveType::UInt32)
        ));
    }

    #[test]
    fn test_builtin_header_structure() {
        let header = get("std_msgs/msg/Header").unwrap();

        assert_eq!(header.fields.len(), 2);
        assert_eq!(header.fields[0].name, "stamp");
        assert_eq!(
            header.fields[0].type_name,
            FieldType::Nested(TIME_TYPE.to_string())
        );
        assert_eq!(header.fields[1].name, "frame_id");
    }

    #[test]
    fn test_get_all() {
        let names: Vec<String> = get_all().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![TIME_TYPE, DURATION_TYPE, HEADER_TYPE]
        );
        assert!(get("std_msgs/msg/String").is_none());
    }
}
