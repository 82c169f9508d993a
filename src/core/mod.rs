// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout rosbag2csv.
//!
//! This module provides the foundational types for the library:
//! - [`BagError`] - Error handling for the whole pipeline
//! - [`CodecValue`] - Decoded value representation
//! - [`DecodedMessage`] - Ordered decoded message

pub mod error;
pub mod value;

pub use error::{BagError, Result};
pub use value::{CodecValue, DecodedField, DecodedMessage, FieldShape};
