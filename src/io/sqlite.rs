// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Sequential reader for rosbag2 `sqlite3` storage.
//!
//! A bag is a directory holding `metadata.yaml` and one or more `.db3`
//! segments. Each segment has a `topics` table, a `messages` table and, for
//! rosbag2 Iron and newer, a `message_definitions` table.
//!
//! Messages are read segment by segment in `(timestamp, id)` order. Rows are
//! fetched in pages keyed on the last `(timestamp, id)` seen so the reader
//! never holds a borrowed statement between `next()` calls.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags};
use tracing::debug;

use crate::core::{BagError, Result};

use super::metadata::{
    BagMetadata, CompressionMode, MessageDefinition, RawMessage, TopicInfo, DB3_EXTENSION,
    SQLITE3_STORAGE,
};
use super::traits::BagReader;

/// Number of rows fetched per query.
const PAGE_SIZE: i64 = 512;

/// Compression format understood in `MESSAGE` mode.
const ZSTD_FORMAT: &str = "zstd";

const MESSAGES_PAGE_SQL: &str = "SELECT id, topic_id, timestamp, data FROM messages \
     WHERE timestamp > ?1 OR (timestamp = ?1 AND id > ?2) \
     ORDER BY timestamp, id LIMIT ?3";

/// One open `.db3` file.
struct Segment {
    path: PathBuf,
    conn: Connection,
    /// Storage topic id to topic name
    topic_names: HashMap<i64, String>,
}

/// Sequential reader over a rosbag2 `sqlite3` bag directory.
pub struct SqliteBagReader {
    path: PathBuf,
    metadata: BagMetadata,
    segments: Vec<Segment>,
    topics: Vec<TopicInfo>,
    definitions: Vec<MessageDefinition>,
    /// Index of the segment being read
    current: usize,
    /// Last `(timestamp, id)` returned from the current segment
    last_key: (i64, i64),
    buffer: VecDeque<RawMessage>,
}

impl SqliteBagReader {
    /// Open a bag directory.
    pub fn open<P: AsRef<Path>>(bag_dir: P) -> Result<Self> {
        let path = bag_dir.as_ref().to_path_buf();
        let metadata = BagMetadata::from_bag_dir(&path)?;

        if !metadata.storage_identifier.is_empty()
            && metadata.storage_identifier != SQLITE3_STORAGE
        {
            return Err(BagError::unsupported(format!(
                "storage '{}' in {}",
                metadata.storage_identifier,
                path.display()
            )));
        }
        match metadata.compression_mode {
            CompressionMode::File => {
                return Err(BagError::unsupported("FILE compression mode"));
            }
            CompressionMode::Message if metadata.compression_format != ZSTD_FORMAT => {
                return Err(BagError::unsupported(format!(
                    "compression format '{}'",
                    metadata.compression_format
                )));
            }
            _ => {}
        }

        let mut reader = Self {
            path,
            metadata,
            segments: Vec::new(),
            topics: Vec::new(),
            definitions: Vec::new(),
            current: 0,
            last_key: (i64::MIN, i64::MIN),
            buffer: VecDeque::new(),
        };

        for segment_path in reader.segment_paths()? {
            reader.open_segment(segment_path)?;
        }

        Ok(reader)
    }

    /// Bag directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed `metadata.yaml`.
    pub fn metadata(&self) -> &BagMetadata {
        &self.metadata
    }

    /// Paths of the opened `.db3` segments, in read order.
    pub fn segment_files(&self) -> Vec<&Path> {
        self.segments.iter().map(|s| s.path.as_path()).collect()
    }

    /// Resolve storage segments from metadata, or every `.db3` by name.
    fn segment_paths(&self) -> Result<Vec<PathBuf>> {
        if self.metadata.relative_file_paths.is_empty() {
            let mut paths: Vec<PathBuf> = fs::read_dir(&self.path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == DB3_EXTENSION))
                .collect();
            paths.sort();
            return Ok(paths);
        }

        self.metadata
            .relative_file_paths
            .iter()
            .map(|relative| {
                let direct = self.path.join(relative);
                if direct.is_file() {
                    return Ok(direct);
                }
                // Older recorders stored paths prefixed with the bag directory name
                Path::new(relative)
                    .file_name()
                    .map(|name| self.path.join(name))
                    .filter(|p| p.is_file())
                    .ok_or_else(|| {
                        BagError::storage(
                            self.path.display().to_string(),
                            format!("storage file '{relative}' listed in metadata not found"),
                        )
                    })
            })
            .collect()
    }

    fn open_segment(&mut self, path: PathBuf) -> Result<()> {
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| BagError::storage(path.display().to_string(), e.to_string()))?;

        let mut topic_names = HashMap::new();
        {
            let mut stmt = conn.prepare("SELECT id, name, type, serialization_format FROM topics")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?;
            for row in rows {
                let (id, name, message_type, format) = row?;
                if !self.topics.iter().any(|t| t.name == name) {
                    let count = self
                        .metadata
                        .topics
                        .iter()
                        .find(|t| t.name == name)
                        .map_or(0, |t| t.message_count);
                    self.topics.push(
                        TopicInfo::new(name.clone(), message_type)
                            .with_serialization_format(format)
                            .with_message_count(count),
                    );
                }
                topic_names.insert(id, name);
            }
        }

        if has_table(&conn, "message_definitions")? {
            let mut stmt = conn.prepare(
                "SELECT topic_type, encoding, encoded_message_definition FROM message_definitions",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(MessageDefinition {
                    topic_type: row.get(0)?,
                    encoding: row.get(1)?,
                    text: row.get(2)?,
                })
            })?;
            for row in rows {
                let definition = row?;
                if !self
                    .definitions
                    .iter()
                    .any(|d| d.topic_type == definition.topic_type)
                {
                    self.definitions.push(definition);
                }
            }
        }

        debug!(
            segment = %path.display(),
            topics = topic_names.len(),
            "Opened storage segment"
        );
        self.segments.push(Segment {
            path,
            conn,
            topic_names,
        });
        Ok(())
    }

    /// Fetch the next page of the current segment; returns the row count.
    fn fill_page(&mut self) -> Result<usize> {
        let segment = &self.segments[self.current];
        let mut stmt = segment.conn.prepare_cached(MESSAGES_PAGE_SQL)?;
        let rows = stmt.query_map(
            params![self.last_key.0, self.last_key.1, PAGE_SIZE],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            },
        )?;

        let mut count = 0;
        for row in rows {
            let (id, topic_id, timestamp, data) = row?;
            let topic = segment
                .topic_names
                .get(&topic_id)
                .ok_or_else(|| BagError::UnknownTopic {
                    topic: format!("id {topic_id} in {}", segment.path.display()),
                })?;
            let data = match self.metadata.compression_mode {
                CompressionMode::Message => zstd::decode_all(data.as_slice()).map_err(|e| {
                    BagError::storage(segment.path.display().to_string(), e.to_string())
                })?,
                _ => data,
            };
            self.buffer
                .push_back(RawMessage::new(topic.clone(), timestamp, data));
            self.last_key = (timestamp, id);
            count += 1;
        }

        Ok(count)
    }
}

impl Iterator for SqliteBagReader {
    type Item = Result<RawMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(message) = self.buffer.pop_front() {
                return Some(Ok(message));
            }
            if self.current >= self.segments.len() {
                return None;
            }
            match self.fill_page() {
                Ok(0) => {
                    self.current += 1;
                    self.last_key = (i64::MIN, i64::MIN);
                }
                Ok(_) => {}
                Err(e) => {
                    // Stop after the first storage error
                    self.current = self.segments.len();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl BagReader for SqliteBagReader {
    fn topics(&self) -> &[TopicInfo] {
        &self.topics
    }

    fn message_definitions(&self) -> &[MessageDefinition] {
        &self.definitions
    }
}

fn has_table(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
