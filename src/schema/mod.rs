// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parsing for ROS 2 `.msg` definitions.
//!
//! This module provides:
//! - The parsed schema AST
//! - A pest-based `.msg` parser
//! - Builtin `Time`, `Duration` and `Header` types
//! - [`MessageRegistry`], which resolves type names for the decoder

pub mod ast;
pub mod builtin_types;
pub mod parser;
pub mod registry;

pub use ast::{canonical_type_name, Field, FieldType, MessageSchema, MessageType, PrimitiveType};
pub use parser::{parse_schema, parse_schema_with_encoding_str};
pub use registry::MessageRegistry;
