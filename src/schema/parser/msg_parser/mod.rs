// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MSG format parser using Pest.
//!
//! This module handles parsing of ROS 2 .msg definitions.
//!
//! The format supports:
//! - Simple field lists (root message)
//! - Dependency blocks separated by `===` lines with "MSG: TypeName" headers
//! - Array types: `T[]` (sequence), `T[<=N]` (bounded sequence), `T[N]` (fixed)
//! - Bounded strings: `string<=N`
//! - Nested types: `package/MessageName` or a same-package `MessageName`
//! - Constants (`TYPE NAME=value`) and default values, both ignored
//! - Comments (# style)

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::core::{BagError, Result};
use crate::schema::ast::{
    canonical_type_name, package_of, resolve_nested_name, Field, FieldType, MessageSchema,
    MessageType, PrimitiveType,
};

/// Pest parser for one line of a ROS .msg schema.
#[derive(Parser)]
#[grammar = "schema/parser/msg_parser/msg.pest"] // Path relative to src/ directory
pub struct MsgParser;

/// Prefix of a dependency block header line.
const DEPENDENCY_HEADER: &str = "MSG:";

/// Parse a .msg definition, including any dependency blocks.
///
/// `name` is the type the root block defines; it is stored in canonical
/// `pkg/msg/Type` form.
pub fn parse(name: &str, definition: &str) -> Result<MessageSchema> {
    let mut schema = MessageSchema::new(name);
    let mut block_name = schema.name.clone();
    let mut block_lines: Vec<(usize, &str)> = Vec::new();
    let mut awaiting_header = false;

    for (index, raw) in definition.lines().enumerate() {
        let trimmed = raw.trim();

        if trimmed.starts_with("===") {
            schema.add_type(parse_block(&block_name, &block_lines)?);
            block_lines.clear();
            awaiting_header = true;
            continue;
        }

        if awaiting_header {
            if trimmed.is_empty() {
                continue;
            }
            let header = trimmed.strip_prefix(DEPENDENCY_HEADER).ok_or_else(|| {
                BagError::parse(
                    format!("{name} line {}", index + 1),
                    format!("expected '{DEPENDENCY_HEADER} <type>' after separator"),
                )
            })?;
            block_name = canonical_type_name(header);
            awaiting_header = false;
            continue;
        }

        block_lines.push((index + 1, raw));
    }

    if awaiting_header {
        return Err(BagError::parse(
            name,
            "definition ends with a separator and no dependency block",
        ));
    }
    schema.add_type(parse_block(&block_name, &block_lines)?);

    Ok(schema)
}

/// Parse the field lines of one block into a message type.
fn parse_block(type_name: &str, lines: &[(usize, &str)]) -> Result<MessageType> {
    let package = package_of(type_name);
    let mut msg_type = MessageType::new(type_name.to_string());

    for &(line_no, text) in lines {
        if let Some(field) = parse_line(text, package)
            .map_err(|e| BagError::parse(format!("{type_name} line {line_no}"), e))?
        {
            msg_type.add_field(field);
        }
    }

    Ok(msg_type)
}

/// Parse one line; returns `None` for blank lines, comments and constants.
fn parse_line(text: &str, package: Option<&str>) -> std::result::Result<Option<Field>, String> {
    let line = MsgParser::parse(Rule::line, text)
        .map_err(|e| e.to_string())?
        .next()
        .ok_or_else(|| "empty parse".to_string())?;

    for item in line.into_inner() {
        if item.as_rule() == Rule::field {
            return build_field(item, package).map(Some);
        }
    }

    Ok(None)
}

fn build_field(pair: Pair<Rule>, package: Option<&str>) -> std::result::Result<Field, String> {
    let mut inner = pair.into_inner();
    let type_pair = inner.next().ok_or("missing field type")?;
    let name = inner.next().ok_or("missing field name")?.as_str().to_string();

    Ok(Field {
        name,
        type_name: build_field_type(type_pair, package)?,
    })
}

/// Build a FieldType from the `field_type` rule.
fn build_field_type(
    pair: Pair<Rule>,
    package: Option<&str>,
) -> std::result::Result<FieldType, String> {
    let mut base = None;
    let mut suffix = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::base_type => {
                let text = item.as_str();
                base = Some(match PrimitiveType::try_from_str(text) {
                    Some(prim) => FieldType::Primitive(prim),
                    None => FieldType::Nested(resolve_nested_name(text, package)),
                });
            }
            // Bounded strings decode exactly like unbounded ones
            Rule::string_bound => {}
            Rule::array_suffix => suffix = Some(item),
            _ => {}
        }
    }

    let base = base.ok_or("missing base type")?;
    let Some(suffix) = suffix else {
        return Ok(base);
    };

    let base_type = Box::new(base);
    match suffix.into_inner().next() {
        None => Ok(FieldType::Sequence {
            base_type,
            bound: None,
        }),
        Some(size) if size.as_rule() == Rule::number => Ok(FieldType::Array {
            base_type,
            size: parse_number(size.as_str())?,
        }),
        Some(bounded) => {
            let number = bounded.into_inner().next().ok_or("missing sequence bound")?;
            Ok(FieldType::Sequence {
                base_type,
                bound: Some(parse_number(number.as_str())?),
            })
        }
    }
}

fn parse_number(text: &str) -> std::result::Result<usize, String> {
    text.parse()
        .map_err(|e| format!("invalid array size '{text}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(schema: &MessageSchema) -> &MessageType {
        schema.root().unwrap()
    }

    #[test]
    fn test_parse_simple_fields() {
        let schema = parse("geometry_msgs/Point", "float64 x\nfloat64 y\nfloat64 z\n").unwrap();
        assert_eq!(schema.name, "geometry_msgs/msg/Point");
        let names: Vec<&str> = root(&schema).fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert_eq!(
            root(&schema).fields[0].type_name,
            FieldType::Primitive(PrimitiveType::Float64)
        );
    }

    #[test]
    fn test_comments_blank_lines_and_constants_are_skipped() {
        let definition = "\
# A status message
uint8 MODE_IDLE=0
uint8 MODE_RUN = 1  # running

uint8 mode   # current mode
string NAME=\"robot # one\"
";
        let schema = parse("pkg/msg/Status", definition).unwrap();
        let fields = &root(&schema).fields;
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "mode");
    }

    #[test]
    fn test_default_values_are_ignored() {
        let schema = parse("pkg/msg/Defaults", "int32 count 5\nstring label \"x\"").unwrap();
        let fields = &root(&schema).fields;
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "count");
        assert_eq!(fields[1].name, "label");
    }

    #[test]
    fn test_array_suffixes() {
        let definition = "\
int32[] dynamic
int32[<=4] bounded
float64[9] covariance
string<=8 tag
string<=8[2] tags";
        let schema = parse("pkg/msg/Arrays", definition).unwrap();
        let fields = &root(&schema).fields;
        let int32 = Box::new(FieldType::Primitive(PrimitiveType::Int32));

        assert_eq!(
            fields[0].type_name,
            FieldType::Sequence {
                base_type: int32.clone(),
                bound: None
            }
        );
        assert_eq!(
            fields[1].type_name,
            FieldType::Sequence {
                base_type: int32,
                bound: Some(4)
            }
        );
        assert_eq!(
            fields[2].type_name,
            FieldType::Array {
                base_type: Box::new(FieldType::Primitive(PrimitiveType::Float64)),
                size: 9
            }
        );
        assert_eq!(
            fields[3].type_name,
            FieldType::Primitive(PrimitiveType::String)
        );
        assert_eq!(
            fields[4].type_name,
            FieldType::Array {
                base_type: Box::new(FieldType::Primitive(PrimitiveType::String)),
                size: 2
            }
        );
    }

    #[test]
    fn test_nested_names_are_resolved() {
        let definition = "Header header\nPoint position\ngeometry_msgs/Quaternion orientation";
        let schema = parse("geometry_msgs/msg/PoseStamped", definition).unwrap();
        let fields = &root(&schema).fields;
        assert_eq!(
            fields[0].type_name,
            FieldType::Nested("std_msgs/msg/Header".into())
        );
        assert_eq!(
            fields[1].type_name,
            FieldType::Nested("geometry_msgs/msg/Point".into())
        );
        assert_eq!(
            fields[2].type_name,
            FieldType::Nested("geometry_msgs/msg/Quaternion".into())
        );
    }

    #[test]
    fn test_dependency_blocks() {
        let definition = "\
std_msgs/Header header
Pose pose
================================================================================
MSG: std_msgs/Header
builtin_interfaces/Time stamp
string frame_id
================================================================================
MSG: geometry_msgs/Pose
Point position
";
        let schema = parse("geometry_msgs/msg/PoseStamped", definition).unwrap();
        assert_eq!(schema.types.len(), 3);

        let header = schema.get_type("std_msgs/Header").unwrap();
        assert_eq!(header.name, "std_msgs/msg/Header");
        assert_eq!(
            header.fields[0].type_name,
            FieldType::Nested("builtin_interfaces/msg/Time".into())
        );

        let pose = schema.get_type("geometry_msgs/msg/Pose").unwrap();
        assert_eq!(
            pose.fields[0].type_name,
            FieldType::Nested("geometry_msgs/msg/Point".into())
        );
    }

    #[test]
    fn test_empty_definition() {
        let schema = parse("std_msgs/msg/Empty", "").unwrap();
        assert!(root(&schema).fields.is_empty());
    }

    #[test]
    fn test_invalid_line_reports_location() {
        let err = parse("pkg/msg/Bad", "float64 x\nfloat64[abc] y").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("pkg/msg/Bad line 2"), "{text}");
    }

    #[test]
    fn test_separator_without_header_is_error() {
        assert!(parse("pkg/msg/Bad", "int32 x\n===\nint32 y").is_err());
        assert!(parse("pkg/msg/Bad", "int32 x\n===\n").is_err());
    }
}
