// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR (Common Data Representation) module.
//!
//! Provides schema-driven decoding of ROS 2 CDR payloads.

pub mod cursor;
pub mod decoder;

pub use cursor::{CdrCursor, CDR_HEADER_SIZE};
pub use decoder::{CdrDecoder, MAX_LENGTH};
