// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for rosbag2csv.
//!
//! One error enum covers the whole pipeline:
//! - Input path validation (the only conditions the CLI reports as user errors)
//! - Bag storage and metadata access
//! - Schema parsing and type resolution
//! - CDR decoding
//! - CSV output

use std::path::{Path, PathBuf};

/// Errors that can occur while converting bags to CSV.
#[derive(Debug, thiserror::Error)]
pub enum BagError {
    /// The input path does not exist
    #[error("Path '{}' does not exist.", path.display())]
    PathNotFound {
        /// Offending path
        path: PathBuf,
    },

    /// The input path exists but is not a directory
    #[error("'{}' is not a directory.", path.display())]
    NotADirectory {
        /// Offending path
        path: PathBuf,
    },

    /// The structured layout is missing its bag root directory
    #[error("'{dir_name}' directory not found in {}", path.display())]
    MissingBagRoot {
        /// Project root that was inspected
        path: PathBuf,
        /// Expected subdirectory name
        dir_name: &'static str,
    },

    /// No bag directory was found under the input path
    #[error("No ROS bags found in '{}'", path.display())]
    NoBagsFound {
        /// Directory that was searched
        path: PathBuf,
    },

    /// Parse error in a schema, metadata file or data
    #[error("Parse error in {context}: {message}")]
    ParseError {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Message type could not be resolved
    #[error("Type not found: '{type_name}'")]
    TypeNotFound {
        /// Type name that was not found
        type_name: String,
    },

    /// Buffer too short for requested read
    #[error(
        "Buffer too short: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available"
    )]
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Sequence or string length above the decoder limit
    #[error("Length {length} exceeds maximum allowed {max}")]
    LengthExceeded {
        /// Length that was read
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// Field decode error with context
    #[error("Failed to decode field '{field_name}' of '{type_name}': {cause}")]
    FieldDecodeError {
        /// Field name
        field_name: String,
        /// Enclosing message type
        type_name: String,
        /// Underlying error
        cause: String,
    },

    /// Message has a `header` field without the expected stamp layout
    #[error("Message of type '{type_name}' has a header without stamp.sec/stamp.nanosec")]
    MissingTimestamp {
        /// Message type name
        type_name: String,
    },

    /// A message references a topic the bag does not declare
    #[error("Message references unknown topic '{topic}'")]
    UnknownTopic {
        /// Topic name or storage id
        topic: String,
    },

    /// Storage backend failure
    #[error("Storage error in {context}: {message}")]
    Storage {
        /// Operation or file being accessed
        context: String,
        /// Error message
        message: String,
    },

    /// Unsupported type or feature
    #[error("Unsupported feature: '{feature}'")]
    Unsupported {
        /// What is not supported
        feature: String,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BagError {
    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        BagError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        BagError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        BagError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create a length exceeded error.
    pub fn length_exceeded(length: usize, max: usize) -> Self {
        BagError::LengthExceeded { length, max }
    }

    /// Create a storage error.
    pub fn storage(context: impl Into<String>, message: impl Into<String>) -> Self {
        BagError::Storage {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported feature error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        BagError::Unsupported {
            feature: feature.into(),
        }
    }

    /// Create a "path not found" error.
    pub fn path_not_found(path: impl AsRef<Path>) -> Self {
        BagError::PathNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a "not a directory" error.
    pub fn not_a_directory(path: impl AsRef<Path>) -> Self {
        BagError::NotADirectory {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a "no bags found" error.
    pub fn no_bags_found(path: impl AsRef<Path>) -> Self {
        BagError::NoBagsFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Whether this error comes from validating the user-supplied input path.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            BagError::PathNotFound { .. }
                | BagError::NotADirectory { .. }
                | BagError::MissingBagRoot { .. }
                | BagError::NoBagsFound { .. }
        )
    }

    /// Remediation lines shown below an input error.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            BagError::NoBagsFound { .. } => Some(
                "Expected either:\n  \
                 - A single ROS bag directory (with metadata.yaml and .db3 files)\n  \
                 - A directory with a 'ros2bag' subdirectory\n  \
                 - A directory containing ROS bag subdirectories",
            ),
            BagError::MissingBagRoot { .. } => {
                Some("Place the recorded bags under a 'ros2bag' folder inside the project root")
            }
            BagError::NotADirectory { .. } => {
                Some("Pass the bag directory itself, not a file inside it")
            }
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for BagError {
    fn from(err: rusqlite::Error) -> Self {
        BagError::storage("sqlite3", err.to_string())
    }
}

impl From<walkdir::Error> for BagError {
    fn from(err: walkdir::Error) -> Self {
        let context = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "directory walk".to_string());
        BagError::storage(context, err.to_string())
    }
}

/// Result type for rosbag2csv operations.
pub type Result<T> = std::result::Result<T, BagError>;
