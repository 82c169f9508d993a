// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message flattening.
//!
//! Reduces a nested, possibly array-valued [`DecodedMessage`] into a lazy
//! sequence of `(path, scalar)` leaves. Paths join field names with `.` and
//! append `[i]` for array elements:
//!
//! ```text
//! pose.position.x
//! points[2].z
//! ```
//!
//! Leaves come out in declared field order, which is the CSV column order.
//! Sequences and fixed-size arrays both expand element-wise; an empty
//! sequence yields nothing.

use crate::core::{CodecValue, DecodedField, DecodedMessage};

/// One flattened leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatField<'a> {
    /// Dotted path with array indices
    pub path: String,
    /// Scalar value at that path
    pub value: &'a CodecValue,
}

#[derive(Debug, Clone)]
enum Frame<'a> {
    Fields {
        prefix: String,
        fields: std::slice::Iter<'a, DecodedField>,
    },
    Elements {
        prefix: String,
        items: std::iter::Enumerate<std::slice::Iter<'a, CodecValue>>,
    },
}

/// Lazy depth-first iterator over the leaves of a value.
///
/// Cloning the iterator restarts nothing; call [`flatten`] again for a
/// fresh pass.
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    root: Option<(String, &'a CodecValue)>,
    stack: Vec<Frame<'a>>,
}

/// Flatten a decoded message with an empty prefix.
pub fn flatten(message: &DecodedMessage) -> Flatten<'_> {
    Flatten {
        root: None,
        stack: vec![Frame::Fields {
            prefix: String::new(),
            fields: message.fields.iter(),
        }],
    }
}

/// Flatten any value under `prefix`.
///
/// A scalar yields exactly one leaf whose path is `prefix`.
pub fn flatten_value<'a>(value: &'a CodecValue, prefix: &str) -> Flatten<'a> {
    Flatten {
        root: Some((prefix.to_string(), value)),
        stack: Vec::new(),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

impl<'a> Flatten<'a> {
    /// Expand a message field according to its declared shape.
    ///
    /// Only array and sequence fields expand element-wise, and only single
    /// fields descend into a nested message. Anything else is a leaf.
    fn visit_field(&mut self, path: String, field: &'a DecodedField) -> Option<FlatField<'a>> {
        match &field.value {
            CodecValue::Array(items) if field.shape.is_collection() => {
                self.stack.push(Frame::Elements {
                    prefix: path,
                    items: items.iter().enumerate(),
                });
                None
            }
            CodecValue::Struct(message) if !field.shape.is_collection() => {
                self.stack.push(Frame::Fields {
                    prefix: path,
                    fields: message.fields.iter(),
                });
                None
            }
            value => Some(FlatField { path, value }),
        }
    }

    /// Expand an array element or root value by its structure.
    fn visit(&mut self, path: String, value: &'a CodecValue) -> Option<FlatField<'a>> {
        match value {
            CodecValue::Array(items) => {
                self.stack.push(Frame::Elements {
                    prefix: path,
                    items: items.iter().enumerate(),
                });
                None
            }
            CodecValue::Struct(message) => {
                self.stack.push(Frame::Fields {
                    prefix: path,
                    fields: message.fields.iter(),
                });
                None
            }
            scalar => Some(FlatField { path, value: scalar }),
        }
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = FlatField<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((path, value)) = self.root.take() {
            if let Some(leaf) = self.visit(path, value) {
                return Some(leaf);
            }
        }

        loop {
            let leaf = match self.stack.last_mut()? {
                Frame::Fields { prefix, fields } => match fields.next() {
                    Some(field) => {
                        let path = join_path(prefix, &field.name);
                        self.visit_field(path, field)
                    }
                    None => {
                        self.stack.pop();
                        continue;
                    }
                },
                Frame::Elements { prefix, items } => match items.next() {
                    Some((index, item)) => {
                        let path = format!("{prefix}[{index}]");
                        self.visit(path, item)
                    }
                    None => {
                        self.stack.pop();
                        continue;
                    }
                },
            };

            if leaf.is_some() {
                return leaf;
            }
        }
    }
}
