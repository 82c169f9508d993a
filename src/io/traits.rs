// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core traits between the dump engine and its collaborators.
//!
//! The dump engine only needs a sequential bag reader and a decoder that
//! turns `(bytes, type name)` into a [`DecodedMessage`]. Keeping both
//! behind traits lets tests drive the engine with in-memory fakes.

use crate::{DecodedMessage, Result};

use super::metadata::{MessageDefinition, RawMessage, TopicInfo};

/// Sequential reader over one bag.
///
/// Messages are yielded in storage order through the `Iterator`
/// implementation (`has-next` / `read-next`).
///
/// # Example
///
/// ```no_run
/// use rosbag2csv::io::traits::BagReader;
///
/// fn describe<R: BagReader>(reader: &R) {
///     for topic in reader.topics() {
///         println!("{} ({})", topic.name, topic.message_type);
///     }
/// }
/// ```
pub trait BagReader: Iterator<Item = Result<RawMessage>> {
    /// All topics with their message types.
    fn topics(&self) -> &[TopicInfo];

    /// Message definitions embedded in the bag (empty for older bags).
    fn message_definitions(&self) -> &[MessageDefinition] {
        &[]
    }

    /// Look up a topic by name.
    fn topic(&self, name: &str) -> Option<&TopicInfo> {
        self.topics().iter().find(|t| t.name == name)
    }

    /// Message type recorded for `name`.
    fn topic_type(&self, name: &str) -> Option<&str> {
        self.topic(name).map(|t| t.message_type.as_str())
    }
}

/// Decoder from serialized payloads to structured messages.
pub trait MessageDecoder {
    /// Register a definition embedded in the bag.
    ///
    /// Default implementation ignores the definition.
    fn add_definition(&mut self, _type_name: &str, _encoding: &str, _definition: &str) {}

    /// Decode `data` as a message of type `type_name`.
    fn decode(&mut self, data: &[u8], type_name: &str) -> Result<DecodedMessage>;
}
