// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Topic dump engine.
//!
//! Replays one bag and writes one CSV file per topic. The first message of
//! a topic fixes its header (`time` followed by the flattened field paths,
//! `header.*` excluded). Every row starts with the message time relative to
//! the first processed message of the pass.
//!
//! Message time is `header.stamp` when the message has a top-level
//! `header` field, otherwise the time the bag recorded it.

pub mod writers;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::{BagError, CodecValue, DecodedMessage, Result};
use crate::encoding::CdrDecoder;
use crate::flatten::{flatten, FlatField};
use crate::io::metadata::{BagMetadata, RawMessage};
use crate::io::sqlite::SqliteBagReader;
use crate::io::traits::{BagReader, MessageDecoder};
use crate::schema::registry::search_paths;
use crate::schema::MessageRegistry;

pub use writers::{csv_file_name, ColumnLayout, TopicWriterRegistry};

/// Topics that never produce CSV output.
pub const SKIPPED_TOPICS: [&str; 2] = ["/rosout", "/parameter_events"];

/// Name of the first CSV column.
pub const TIME_COLUMN: &str = "time";

/// Top-level field holding the message stamp.
pub const HEADER_FIELD: &str = "header";

/// Flattened paths with this prefix are left out of the CSV.
pub const HEADER_PREFIX: &str = "header.";

/// Serialization format the decoder understands.
const CDR_FORMAT: &str = "cdr";

/// Options for a dump pass.
///
/// Loadable from TOML; every key is optional.
///
/// ```toml
/// extra_skip_topics = ["/tf_static"]
/// progress_interval = 500
/// strict_columns = true
/// msg_paths = ["/opt/ros/humble/share"]
/// use_ament_prefix_path = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DumpOptions {
    /// Topics skipped in addition to [`SKIPPED_TOPICS`]
    pub extra_skip_topics: Vec<String>,
    /// Report progress every this many processed messages (0 disables)
    pub progress_interval: u64,
    /// Use the union of all paths seen per topic as its header
    pub strict_columns: bool,
    /// Extra directories searched for `.msg` files
    pub msg_paths: Vec<PathBuf>,
    /// Also search the install prefixes in `AMENT_PREFIX_PATH`
    pub use_ament_prefix_path: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            extra_skip_topics: Vec::new(),
            progress_interval: 1000,
            strict_columns: false,
            msg_paths: Vec::new(),
            use_ament_prefix_path: true,
        }
    }
}

impl DumpOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| BagError::parse(path.display().to_string(), e.to_string()))
    }

    /// Skip another topic.
    pub fn with_skip_topic(mut self, topic: impl Into<String>) -> Self {
        self.extra_skip_topics.push(topic.into());
        self
    }

    /// Set the progress interval.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Enable or disable union headers.
    pub fn with_strict_columns(mut self, strict: bool) -> Self {
        self.strict_columns = strict;
        self
    }

    /// Add a `.msg` search directory.
    pub fn with_msg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.msg_paths.push(path.into());
        self
    }

    /// Enable or disable the `AMENT_PREFIX_PATH` lookup.
    pub fn with_ament_prefix_path(mut self, enabled: bool) -> Self {
        self.use_ament_prefix_path = enabled;
        self
    }

    /// Whether messages on `topic` are left out.
    pub fn is_skipped(&self, topic: &str) -> bool {
        SKIPPED_TOPICS.contains(&topic) || self.extra_skip_topics.iter().any(|t| t == topic)
    }

    /// Message registry searching the configured directories.
    pub fn registry(&self) -> MessageRegistry {
        MessageRegistry::with_search_paths(search_paths(
            &self.msg_paths,
            self.use_ament_prefix_path,
        ))
    }
}

/// Result of a dump pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpStats {
    /// Topics that produced a CSV file
    pub topic_count: usize,
    /// Messages written as rows
    pub message_count: u64,
    /// Messages dropped because their topic is skipped
    pub skipped_messages: u64,
}

/// Dump the bag at `bag_path` into `output_dir`.
pub fn dump(
    bag_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    options: &DumpOptions,
) -> Result<DumpStats> {
    dump_with_progress(bag_path, output_dir, options, |_| {})
}

/// Dump a bag, calling `progress` with the relative time of every
/// `progress_interval`-th processed message, the first one included.
pub fn dump_with_progress<F>(
    bag_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    options: &DumpOptions,
    progress: F,
) -> Result<DumpStats>
where
    F: FnMut(f64),
{
    let bag_path = bag_path.as_ref();
    let reader = SqliteBagReader::open(bag_path)?;
    log_bag(bag_path, reader.metadata());

    let mut decoder = CdrDecoder::new(options.registry());
    let layout = if options.strict_columns {
        ColumnLayout::Fixed(union_columns(
            SqliteBagReader::open(bag_path)?,
            &mut decoder,
            options,
        )?)
    } else {
        ColumnLayout::FirstMessage
    };

    dump_messages(
        reader,
        &mut decoder,
        output_dir.as_ref(),
        options,
        &layout,
        progress,
    )
}

/// Replay `reader` through `decoder` into per-topic CSV files.
///
/// This is the storage-independent core of [`dump_with_progress`].
pub fn dump_messages<R, D, F>(
    reader: R,
    decoder: &mut D,
    output_dir: &Path,
    options: &DumpOptions,
    layout: &ColumnLayout,
    mut progress: F,
) -> Result<DumpStats>
where
    R: BagReader,
    D: MessageDecoder,
    F: FnMut(f64),
{
    fs::create_dir_all(output_dir)?;
    let topic_types = prepare(&reader, decoder);

    let mut writers = TopicWriterRegistry::new(output_dir);
    let mut stats = DumpStats::default();
    let mut start_time: Option<f64> = None;

    for message in reader {
        let message = message?;
        if options.is_skipped(&message.topic) {
            stats.skipped_messages += 1;
            continue;
        }

        let decoded = decode(&message, &topic_types, decoder)?;

        if !writers.contains(&message.topic) {
            let (columns, aligned) = match layout.columns(&message.topic) {
                Some(columns) => (columns.to_vec(), true),
                None => (data_leaves(&decoded).map(|l| l.path).collect(), false),
            };
            writers.create(&message.topic, columns, aligned)?;
        }

        let time = message_time(&decoded, &message)?;
        let start = *start_time.get_or_insert(time);
        let relative = time - start;
        writers.write_row(&message.topic, relative, data_leaves(&decoded))?;

        if options.progress_interval > 0 && stats.message_count % options.progress_interval == 0 {
            progress(relative);
        }
        stats.message_count += 1;
    }

    stats.topic_count = writers.finish()?;
    debug!(
        topics = stats.topic_count,
        messages = stats.message_count,
        skipped = stats.skipped_messages,
        "dump finished"
    );
    Ok(stats)
}

/// Collect, per topic, the union of flattened paths over the whole bag in
/// first-seen order.
pub fn union_columns<R, D>(
    reader: R,
    decoder: &mut D,
    options: &DumpOptions,
) -> Result<HashMap<String, Vec<String>>>
where
    R: BagReader,
    D: MessageDecoder,
{
    let topic_types = prepare(&reader, decoder);
    let mut columns: HashMap<String, (Vec<String>, HashSet<String>)> = HashMap::new();

    for message in reader {
        let message = message?;
        if options.is_skipped(&message.topic) {
            continue;
        }

        let decoded = decode(&message, &topic_types, decoder)?;
        let (order, seen) = columns.entry(message.topic).or_default();
        for leaf in data_leaves(&decoded) {
            if seen.insert(leaf.path.clone()) {
                order.push(leaf.path);
            }
        }
    }

    Ok(columns
        .into_iter()
        .map(|(topic, (order, _))| (topic, order))
        .collect())
}

/// Time of a message in seconds.
///
/// Uses `header.stamp.sec + header.stamp.nanosec * 1e-9` when the message
/// has a top-level `header`; otherwise the recorded bag time.
pub fn message_time(decoded: &DecodedMessage, raw: &RawMessage) -> Result<f64> {
    let Some(header) = decoded.get(HEADER_FIELD) else {
        return Ok(raw.timestamp_secs());
    };

    let stamp = header
        .as_struct()
        .and_then(|h| h.get("stamp"))
        .and_then(CodecValue::as_struct);
    let parts = stamp.and_then(|s| {
        let sec = s.get("sec").and_then(CodecValue::as_f64)?;
        let nanosec = s.get("nanosec").and_then(CodecValue::as_f64)?;
        Some((sec, nanosec))
    });

    match parts {
        Some((sec, nanosec)) => Ok(sec + 1e-9 * nanosec),
        None => Err(BagError::MissingTimestamp {
            type_name: decoded.type_name.clone(),
        }),
    }
}

/// Flattened leaves written to the CSV (everything outside `header.`).
pub fn data_leaves(decoded: &DecodedMessage) -> impl Iterator<Item = FlatField<'_>> {
    flatten(decoded).filter(|leaf| !leaf.path.starts_with(HEADER_PREFIX))
}

/// Feed embedded definitions to the decoder and map topics to their
/// type and serialization format.
fn prepare<R, D>(reader: &R, decoder: &mut D) -> HashMap<String, (String, String)>
where
    R: BagReader,
    D: MessageDecoder,
{
    for definition in reader.message_definitions() {
        decoder.add_definition(
            &definition.topic_type,
            &definition.encoding,
            &definition.text,
        );
    }

    reader
        .topics()
        .iter()
        .map(|t| {
            (
                t.name.clone(),
                (t.message_type.clone(), t.serialization_format.clone()),
            )
        })
        .collect()
}

fn decode<D: MessageDecoder>(
    message: &RawMessage,
    topic_types: &HashMap<String, (String, String)>,
    decoder: &mut D,
) -> Result<DecodedMessage> {
    let (message_type, format) =
        topic_types
            .get(&message.topic)
            .ok_or_else(|| BagError::UnknownTopic {
                topic: message.topic.clone(),
            })?;
    if format != CDR_FORMAT {
        return Err(BagError::unsupported(format!(
            "serialization format '{format}' on topic {}",
            message.topic
        )));
    }
    decoder.decode(&message.data, message_type)
}

fn log_bag(bag_path: &Path, metadata: &BagMetadata) {
    let start = chrono::DateTime::from_timestamp_nanos(metadata.starting_time_ns);
    info!(
        bag = %bag_path.display(),
        started = %start.to_rfc3339(),
        messages = metadata.message_count,
        topics = metadata.topics.len(),
        "dumping bag"
    );
}
