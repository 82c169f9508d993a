// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message decoding.
//!
//! - [`cdr`] - ROS 2 CDR (Common Data Representation) decoding

pub mod cdr;

pub use cdr::CdrDecoder;
