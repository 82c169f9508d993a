// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! Builds real rosbag2 sqlite3 bags and CDR payloads on disk.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use rusqlite::{params, Connection};

// ============================================================================
// CDR payloads
// ============================================================================

/// Little-endian CDR payload writer.
///
/// Alignment is relative to the end of the 4-byte encapsulation header.
pub struct CdrWriter {
    buf: Vec<u8>,
}

impl Default for CdrWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CdrWriter {
    pub fn new() -> Self {
        Self {
            buf: vec![0x00, 0x01, 0x00, 0x00],
        }
    }

    fn align(&mut self, n: usize) {
        while (self.buf.len() - 4) % n != 0 {
            self.buf.push(0);
        }
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.buf.push(v as u8);
        self
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.align(4);
        self.buf.write_i32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.align(4);
        self.buf.write_u32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.align(4);
        self.buf.write_f32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.align(8);
        self.buf.write_f64::<LittleEndian>(v).unwrap();
        self
    }

    pub fn string(&mut self, s: &str) -> &mut Self {
        self.u32(s.len() as u32 + 1);
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
        self
    }

    /// `std_msgs/msg/Header`
    pub fn header(&mut self, sec: i32, nanosec: u32, frame_id: &str) -> &mut Self {
        self.i32(sec).u32(nanosec).string(frame_id)
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

// ============================================================================
// Message types used across the tests
// ============================================================================

/// Definition text for `test_msgs/msg/Reading`, as a recorder would embed it.
pub const READING_TYPE: &str = "test_msgs/msg/Reading";

pub const READING_DEFINITION: &str = "\
std_msgs/Header header
geometry_msgs/Point position
float64[] ranges
string label
bool valid
================================================================================
MSG: geometry_msgs/Point
float64 x
float64 y
float64 z
";

/// Encode a `test_msgs/msg/Reading`.
pub fn reading(
    sec: i32,
    nanosec: u32,
    position: [f64; 3],
    ranges: &[f64],
    label: &str,
    valid: bool,
) -> Vec<u8> {
    let mut w = CdrWriter::new();
    w.header(sec, nanosec, "base_link");
    for v in position {
        w.f64(v);
    }
    w.u32(ranges.len() as u32);
    for v in ranges {
        w.f64(*v);
    }
    w.string(label).bool(valid);
    w.finish()
}

/// `std_msgs/msg/Int32`, resolved from a `.msg` search directory.
pub const INT32_TYPE: &str = "std_msgs/msg/Int32";

pub fn int32(v: i32) -> Vec<u8> {
    CdrWriter::new().i32(v).finish()
}

/// Write `<root>/std_msgs/msg/Int32.msg` and return `root`.
pub fn write_msg_tree(root: &Path) -> PathBuf {
    let dir = root.join("std_msgs").join("msg");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Int32.msg"), "int32 data\n").unwrap();
    root.to_path_buf()
}

// ============================================================================
// Bag builder
// ============================================================================

/// Builds a single-segment rosbag2 sqlite3 bag directory.
pub struct BagBuilder {
    dir: PathBuf,
    topics: Vec<(String, String)>,
    definitions: Vec<(String, String)>,
    messages: Vec<(String, i64, Vec<u8>)>,
}

impl BagBuilder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            topics: Vec::new(),
            definitions: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn topic(mut self, name: &str, message_type: &str) -> Self {
        self.topics.push((name.to_string(), message_type.to_string()));
        self
    }

    /// Embed a `ros2msg` definition in the `message_definitions` table.
    pub fn definition(mut self, message_type: &str, text: &str) -> Self {
        self.definitions
            .push((message_type.to_string(), text.to_string()));
        self
    }

    pub fn message(mut self, topic: &str, timestamp: i64, data: Vec<u8>) -> Self {
        self.messages.push((topic.to_string(), timestamp, data));
        self
    }

    /// Write the bag and return its directory.
    pub fn write(self) -> PathBuf {
        fs::create_dir_all(&self.dir).unwrap();
        let name = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "bag".to_string());
        let db_name = format!("{name}_0.db3");

        let conn = Connection::open(self.dir.join(&db_name)).unwrap();
        conn.execute_batch(
            "CREATE TABLE topics(id INTEGER PRIMARY KEY, name TEXT NOT NULL, type TEXT NOT NULL, \
             serialization_format TEXT NOT NULL, offered_qos_profiles TEXT NOT NULL);
             CREATE TABLE messages(id INTEGER PRIMARY KEY, topic_id INTEGER NOT NULL, \
             timestamp INTEGER NOT NULL, data BLOB NOT NULL);
             CREATE INDEX timestamp_idx ON messages (timestamp ASC);",
        )
        .unwrap();
        if !self.definitions.is_empty() {
            conn.execute_batch(
                "CREATE TABLE message_definitions(id INTEGER PRIMARY KEY, topic_type TEXT NOT NULL, \
                 encoding TEXT NOT NULL, encoded_message_definition TEXT NOT NULL, \
                 type_description_hash TEXT NOT NULL);",
            )
            .unwrap();
            for (message_type, text) in &self.definitions {
                conn.execute(
                    "INSERT INTO message_definitions(topic_type, encoding, encoded_message_definition, \
                     type_description_hash) VALUES (?1, 'ros2msg', ?2, '')",
                    params![message_type, text],
                )
                .unwrap();
            }
        }

        conn.execute_batch("BEGIN").unwrap();
        for (i, (name, message_type)) in self.topics.iter().enumerate() {
            conn.execute(
                "INSERT INTO topics VALUES (?1, ?2, ?3, 'cdr', '')",
                params![i as i64 + 1, name, message_type],
            )
            .unwrap();
        }
        for (topic, timestamp, data) in &self.messages {
            let topic_id = self
                .topics
                .iter()
                .position(|(name, _)| name == topic)
                .map(|i| i as i64 + 1)
                .unwrap();
            conn.execute(
                "INSERT INTO messages(topic_id, timestamp, data) VALUES (?1, ?2, ?3)",
                params![topic_id, timestamp, data],
            )
            .unwrap();
        }
        conn.execute_batch("COMMIT").unwrap();
        drop(conn);

        fs::write(self.dir.join("metadata.yaml"), self.metadata(&db_name)).unwrap();
        self.dir
    }

    fn metadata(&self, db_name: &str) -> String {
        let start = self.messages.iter().map(|m| m.1).min().unwrap_or(0);
        let end = self.messages.iter().map(|m| m.1).max().unwrap_or(0);

        let mut yaml = String::from("rosbag2_bagfile_information:\n  version: 5\n");
        yaml.push_str("  storage_identifier: sqlite3\n");
        yaml.push_str(&format!("  duration:\n    nanoseconds: {}\n", end - start));
        yaml.push_str(&format!(
            "  starting_time:\n    nanoseconds_since_epoch: {start}\n"
        ));
        yaml.push_str(&format!("  message_count: {}\n", self.messages.len()));
        yaml.push_str("  topics_with_message_count:\n");
        for (name, message_type) in &self.topics {
            let count = self.messages.iter().filter(|m| &m.0 == name).count();
            yaml.push_str(&format!(
                "    - topic_metadata:\n        name: {name}\n        type: {message_type}\n        \
                 serialization_format: cdr\n        offered_qos_profiles: \"\"\n      \
                 message_count: {count}\n"
            ));
        }
        yaml.push_str("  compression_format: \"\"\n  compression_mode: \"\"\n");
        yaml.push_str(&format!("  relative_file_paths:\n    - {db_name}\n"));
        yaml
    }
}

/// A bag with one `Reading` topic and a `/rosout` topic that must be skipped.
pub fn reading_bag(dir: &Path) -> PathBuf {
    BagBuilder::new(dir)
        .topic("/sensor/reading", READING_TYPE)
        .topic("/rosout", READING_TYPE)
        .definition(READING_TYPE, READING_DEFINITION)
        .message(
            "/sensor/reading",
            5,
            reading(10, 0, [1.0, 2.0, 3.0], &[0.5, 1.5], "ok", true),
        )
        .message(
            "/rosout",
            6,
            reading(11, 0, [0.0, 0.0, 0.0], &[], "log", false),
        )
        .message(
            "/sensor/reading",
            7,
            reading(10, 250_000_000, [4.0, 5.0, 6.0], &[2.5, 3.5], "late", false),
        )
        .write()
}

/// Expected CSV for the `/sensor/reading` topic of [`reading_bag`].
pub const READING_CSV: &str = "\
time,position.x,position.y,position.z,ranges[0],ranges[1],label,valid
0.0,1.0,2.0,3.0,0.5,1.5,ok,True
0.25,4.0,5.0,6.0,2.5,3.5,late,False
";
