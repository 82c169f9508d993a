// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-topic CSV files for one dump pass.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::value::write_float;
use crate::core::CodecValue;
use crate::flatten::FlatField;
use crate::Result;

use super::TIME_COLUMN;

/// How a topic's header columns are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnLayout {
    /// Header comes from the first message; rows are written as flattened
    #[default]
    FirstMessage,
    /// Header fixed per topic in advance; rows are aligned to it and
    /// missing cells stay empty
    Fixed(HashMap<String, Vec<String>>),
}

impl ColumnLayout {
    /// Fixed columns for `topic`, if any.
    pub fn columns(&self, topic: &str) -> Option<&[String]> {
        match self {
            ColumnLayout::FirstMessage => None,
            ColumnLayout::Fixed(columns) => columns.get(topic).map(Vec::as_slice),
        }
    }
}

/// CSV file name for a topic: leading slashes removed, `/` replaced by `_`.
///
/// ```
/// use rosbag2csv::dump::writers::csv_file_name;
///
/// assert_eq!(csv_file_name("/robot/odom"), "robot_odom.csv");
/// ```
pub fn csv_file_name(topic: &str) -> String {
    format!("{}.csv", topic.trim_start_matches('/').replace('/', "_"))
}

struct TopicFile {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Present when rows are aligned to a fixed header
    aligned: Option<Vec<String>>,
    rows: u64,
}

/// Open CSV files keyed by topic name.
///
/// Files are created lazily on a topic's first message. Dropping the
/// registry closes every file; [`TopicWriterRegistry::finish`] also flushes
/// and reports write errors.
pub struct TopicWriterRegistry {
    output_dir: PathBuf,
    files: HashMap<String, TopicFile>,
    line: String,
}

impl TopicWriterRegistry {
    /// Create an empty registry writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            files: HashMap::new(),
            line: String::new(),
        }
    }

    /// Whether `topic` already has a file.
    pub fn contains(&self, topic: &str) -> bool {
        self.files.contains_key(topic)
    }

    /// Number of topic files created so far.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if no file has been created.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Path of the CSV file for `topic`, if created.
    pub fn file_path(&self, topic: &str) -> Option<&Path> {
        self.files.get(topic).map(|f| f.path.as_path())
    }

    /// Create the file for `topic` and write its header row.
    ///
    /// With `aligned` set, later rows are matched to `columns` by path.
    pub fn create(&mut self, topic: &str, columns: Vec<String>, aligned: bool) -> Result<()> {
        let path = self.output_dir.join(csv_file_name(topic));
        let mut writer = BufWriter::new(File::create(&path)?);

        let mut header = String::from(TIME_COLUMN);
        for column in &columns {
            header.push(',');
            header.push_str(column);
        }
        header.push('\n');
        writer.write_all(header.as_bytes())?;

        debug!(topic, file = %path.display(), columns = columns.len(), "created topic file");
        self.files.insert(
            topic.to_string(),
            TopicFile {
                path,
                writer,
                aligned: aligned.then_some(columns),
                rows: 0,
            },
        );
        Ok(())
    }

    /// Append one row: the relative time followed by the leaf values.
    pub fn write_row<'v, I>(&mut self, topic: &str, time: f64, leaves: I) -> Result<()>
    where
        I: IntoIterator<Item = FlatField<'v>>,
    {
        let file = self
            .files
            .get_mut(topic)
            .ok_or_else(|| crate::BagError::UnknownTopic {
                topic: topic.to_string(),
            })?;

        let line = &mut self.line;
        line.clear();
        // Writing into a String cannot fail
        let _ = write_float(line, time);

        match &file.aligned {
            None => {
                for leaf in leaves {
                    let _ = write!(line, ",{}", leaf.value);
                }
            }
            Some(columns) => {
                let values: HashMap<String, &CodecValue> =
                    leaves.into_iter().map(|l| (l.path, l.value)).collect();
                for column in columns {
                    line.push(',');
                    if let Some(value) = values.get(column) {
                        let _ = write!(line, "{value}");
                    }
                }
            }
        }
        line.push('\n');

        file.writer.write_all(line.as_bytes())?;
        file.rows += 1;
        Ok(())
    }

    /// Flush and close every file, returning the number of topic files.
    pub fn finish(self) -> Result<usize> {
        let count = self.files.len();
        for (topic, mut file) in self.files {
            file.writer.flush()?;
            debug!(topic = %topic, rows = file.rows, "closed topic file");
        }
        Ok(count)
    }
}
