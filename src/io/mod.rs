// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for rosbag2 recordings.
//!
//! This module provides the bag metadata types, the reader and decoder
//! traits the dump engine is written against, and the `sqlite3` storage
//! reader.

pub mod metadata;
pub mod sqlite;
pub mod traits;

// Re-exports
pub use metadata::{BagMetadata, CompressionMode, MessageDefinition, RawMessage, TopicInfo};
pub use sqlite::SqliteBagReader;
pub use traits::{BagReader, MessageDecoder};
