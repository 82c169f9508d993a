// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag2 metadata types.
//!
//! This module provides the parsed form of a bag's `metadata.yaml` together
//! with the topic, definition and raw message records the storage reader
//! hands to the dump engine.

use std::fs;
use std::path::Path;

use yaml_rust2::{Yaml, YamlLoader};

use crate::core::{BagError, Result};

/// File name of the rosbag2 metadata document inside a bag directory.
pub const METADATA_FILE: &str = "metadata.yaml";

/// Extension of rosbag2 sqlite3 storage segments.
pub const DB3_EXTENSION: &str = "db3";

/// Storage identifier of the sqlite3 plugin.
pub const SQLITE3_STORAGE: &str = "sqlite3";

/// Root key of `metadata.yaml`.
const ROOT_KEY: &str = "rosbag2_bagfile_information";

/// How (and whether) bag payloads are compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMode {
    /// Plain payloads
    #[default]
    None,
    /// Each message payload is compressed individually
    Message,
    /// Whole storage files are compressed
    File,
}

impl CompressionMode {
    /// Parse the `compression_mode` value.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Ok(CompressionMode::None),
            "MESSAGE" => Ok(CompressionMode::Message),
            "FILE" => Ok(CompressionMode::File),
            other => Err(BagError::parse(
                METADATA_FILE,
                format!("unknown compression_mode '{other}'"),
            )),
        }
    }
}

/// Information about a topic recorded in a bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicInfo {
    /// Topic name (e.g., "/joint_states")
    pub name: String,
    /// Message type name (e.g., "sensor_msgs/msg/JointState")
    pub message_type: String,
    /// Serialization format (e.g., "cdr")
    pub serialization_format: String,
    /// Number of messages in this topic (0 if unknown)
    pub message_count: u64,
}

impl TopicInfo {
    /// Create a new TopicInfo.
    pub fn new(name: impl Into<String>, message_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message_type: message_type.into(),
            serialization_format: "cdr".to_string(),
            message_count: 0,
        }
    }

    /// Set the serialization format.
    pub fn with_serialization_format(mut self, format: impl Into<String>) -> Self {
        self.serialization_format = format.into();
        self
    }

    /// Set the message count.
    pub fn with_message_count(mut self, count: u64) -> Self {
        self.message_count = count;
        self
    }
}

/// A message definition embedded in the bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefinition {
    /// Type the definition describes
    pub topic_type: String,
    /// Definition encoding (e.g., "ros2msg", "ros2idl")
    pub encoding: String,
    /// Definition text, dependencies included
    pub text: String,
}

/// Raw message data with metadata (undecoded).
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    /// Topic the message was recorded on
    pub topic: String,
    /// Recording timestamp (nanoseconds since Unix epoch)
    pub timestamp: i64,
    /// Serialized payload (decompressed)
    pub data: Vec<u8>,
}

impl RawMessage {
    /// Create a new RawMessage.
    pub fn new(topic: impl Into<String>, timestamp: i64, data: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            timestamp,
            data,
        }
    }

    /// Recording timestamp in seconds.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp as f64 * 1e-9
    }

    /// Get the data length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the message has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Parsed `metadata.yaml`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BagMetadata {
    /// Metadata format version
    pub version: i64,
    /// Storage plugin identifier (e.g., "sqlite3")
    pub storage_identifier: String,
    /// Storage segment paths, relative to the bag directory
    pub relative_file_paths: Vec<String>,
    /// Recording start (nanoseconds since Unix epoch)
    pub starting_time_ns: i64,
    /// Recording duration (nanoseconds)
    pub duration_ns: i64,
    /// Total message count
    pub message_count: u64,
    /// Compression format (e.g., "zstd"), empty when uncompressed
    pub compression_format: String,
    /// Compression mode
    pub compression_mode: CompressionMode,
    /// Topics with their message counts
    pub topics: Vec<TopicInfo>,
}

impl BagMetadata {
    /// Read `metadata.yaml` from a bag directory.
    pub fn from_bag_dir(bag_dir: &Path) -> Result<Self> {
        let path = bag_dir.join(METADATA_FILE);
        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    /// Parse the YAML content of `metadata.yaml`.
    pub fn parse(content: &str) -> Result<Self> {
        let docs = YamlLoader::load_from_str(content)
            .map_err(|e| BagError::parse(METADATA_FILE, e.to_string()))?;
        let doc = docs
            .first()
            .ok_or_else(|| BagError::parse(METADATA_FILE, "empty document"))?;

        let info = &doc[ROOT_KEY];
        if info.as_hash().is_none() {
            return Err(BagError::parse(
                METADATA_FILE,
                format!("missing '{ROOT_KEY}' mapping"),
            ));
        }

        let relative_file_paths = info["relative_file_paths"]
            .as_vec()
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(|p| p.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let topics = info["topics_with_message_count"]
            .as_vec()
            .map(|entries| entries.iter().filter_map(parse_topic_entry).collect())
            .unwrap_or_default();

        Ok(Self {
            version: info["version"].as_i64().unwrap_or(0),
            storage_identifier: yaml_string(&info["storage_identifier"]),
            relative_file_paths,
            starting_time_ns: info["starting_time"]["nanoseconds_since_epoch"]
                .as_i64()
                .unwrap_or(0),
            duration_ns: info["duration"]["nanoseconds"].as_i64().unwrap_or(0),
            message_count: yaml_count(&info["message_count"]),
            compression_format: yaml_string(&info["compression_format"]),
            compression_mode: CompressionMode::parse(&yaml_string(&info["compression_mode"]))?,
            topics,
        })
    }

    /// Recording start in seconds since the Unix epoch.
    pub fn starting_time_secs(&self) -> f64 {
        self.starting_time_ns as f64 * 1e-9
    }
}

fn parse_topic_entry(entry: &Yaml) -> Option<TopicInfo> {
    let topic = &entry["topic_metadata"];
    let name = topic["name"].as_str()?;
    let message_type = topic["type"].as_str()?;
    let mut info = TopicInfo::new(name, message_type)
        .with_message_count(yaml_count(&entry["message_count"]));
    if let Some(format) = topic["serialization_format"].as_str() {
        info = info.with_serialization_format(format);
    }
    Some(info)
}

fn yaml_string(value: &Yaml) -> String {
    value.as_str().unwrap_or_default().to_string()
}

fn yaml_count(value: &Yaml) -> u64 {
    value.as_i64().and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"
rosbag2_bagfile_information:
  version: 5
  storage_identifier: sqlite3
  duration:
    nanoseconds: 2500000000
  starting_time:
    nanoseconds_since_epoch: 1700000000000000000
  message_count: 3
  topics_with_message_count:
    - topic_metadata:
        name: /odom
        type: nav_msgs/msg/Odometry
        serialization_format: cdr
        offered_qos_profiles: ""
      message_count: 2
    - topic_metadata:
        name: /rosout
        type: rcl_interfaces/msg/Log
        serialization_format: cdr
        offered_qos_profiles: ""
      message_count: 1
  compression_format: ""
  compression_mode: ""
  relative_file_paths:
    - run_0.db3
"#;

    #[test]
    fn test_parse_metadata() {
        let meta = BagMetadata::parse(METADATA).unwrap();
        assert_eq!(meta.version, 5);
        assert_eq!(meta.storage_identifier, "sqlite3");
        assert_eq!(meta.relative_file_paths, vec!["run_0.db3"]);
        assert_eq!(meta.starting_time_ns, 1_700_000_000_000_000_000);
        assert_eq!(meta.duration_ns, 2_500_000_000);
        assert_eq!(meta.message_count, 3);
        assert_eq!(meta.compression_mode, CompressionMode::None);
        assert_eq!(meta.topics.len(), 2);
        assert_eq!(meta.topics[0].name, "/odom");
        assert_eq!(meta.topics[0].message_type, "nav_msgs/msg/Odometry");
        assert_eq!(meta.topics[0].message_count, 2);
    }

    #[test]
    fn test_parse_minimal_metadata() {
        let meta = BagMetadata::parse("rosbag2_bagfile_information:\n  version: 4\n").unwrap();
        assert!(meta.relative_file_paths.is_empty());
        assert!(meta.topics.is_empty());
        assert!(meta.storage_identifier.is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_root() {
        let err = BagMetadata::parse("something_else:\n  version: 4\n").unwrap_err();
        assert!(matches!(err, BagError::ParseError { .. }));
        assert!(BagMetadata::parse("").is_err());
    }

    #[test]
    fn test_compression_mode() {
        assert_eq!(
            CompressionMode::parse("MESSAGE").unwrap(),
            CompressionMode::Message
        );
        assert_eq!(CompressionMode::parse("file").unwrap(), CompressionMode::File);
        assert_eq!(CompressionMode::parse("").unwrap(), CompressionMode::None);
        assert!(CompressionMode::parse("CHUNK").is_err());
    }

    #[test]
    fn test_raw_message_seconds() {
        let msg = RawMessage::new("/imu", 1_500_000_000, vec![0, 1, 0, 0]);
        assert!((msg.timestamp_secs() - 1.5).abs() < 1e-12);
        assert_eq!(msg.len(), 4);
    }
}
