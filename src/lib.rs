// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # rosbag2csv
//!
//! Convert ROS 2 rosbag2 recordings into per-topic CSV files.
//!
//! The library is organized leaf to root:
//! - `core/` - Error type and decoded value model
//! - `schema/` - `.msg` parsing and the message definition registry
//! - `encoding/` - ROS 2 CDR decoding
//! - `io/` - rosbag2 metadata and the sqlite3 storage reader
//! - `flatten/` - Nested message to `(path, scalar)` flattening
//! - `discovery/` - Locating bag directories in a tree
//! - `dump/` - Replaying one bag into per-topic CSV files
//! - `layout/` - Choosing single, structured or discovered processing
//!
//! ## Example: Converting one bag
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rosbag2csv::{dump, DumpOptions};
//!
//! let stats = dump("recordings/trial_1", "recordings/trial_1", &DumpOptions::default())?;
//! println!("{} topics", stats.topic_count);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{BagError, CodecValue, DecodedField, DecodedMessage, FieldShape, Result};

// Schema parsing and type registry
pub mod schema;

// CDR decoding
pub mod encoding;

// Bag storage
pub mod io;

pub use io::metadata::{BagMetadata, RawMessage, TopicInfo};
pub use io::sqlite::SqliteBagReader;
pub use io::traits::{BagReader, MessageDecoder};

// Message flattening
pub mod flatten;

pub use flatten::{flatten, flatten_value, FlatField};

// Bag discovery
pub mod discovery;

pub use discovery::{find_bags, is_bag};

// Per-topic CSV dump
pub mod dump;

pub use dump::{dump, dump_with_progress, DumpOptions, DumpStats};

// Input layouts and output mirroring
pub mod layout;

pub use layout::{BagJob, Layout};
