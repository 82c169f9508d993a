// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message definition registry.
//!
//! Resolves ROS 2 type names to parsed message types. Sources, in priority
//! order:
//! 1. Definitions embedded in the bag (`message_definitions` table)
//! 2. `.msg` files under the configured search directories
//! 3. The builtin `Time`, `Duration` and `Header` types
//!
//! A type's nested references are loaded transitively by
//! [`MessageRegistry::ensure_loaded`], so the decoder only ever does exact
//! lookups.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::{BagError, Result};
use crate::schema::ast::{canonical_type_name, MessageType};
use crate::schema::builtin_types;
use crate::schema::parser::{parse_schema, parse_schema_with_encoding_str};

/// Environment variable listing ROS 2 install prefixes.
pub const AMENT_PREFIX_PATH: &str = "AMENT_PREFIX_PATH";

/// Registry of message types keyed by canonical `pkg/msg/Type` name.
#[derive(Debug, Default)]
pub struct MessageRegistry {
    types: HashMap<String, MessageType>,
    search_paths: Vec<PathBuf>,
}

impl MessageRegistry {
    /// Create an empty registry with no search directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that searches the given directories for `.msg` files.
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            types: HashMap::new(),
            search_paths,
        }
    }

    /// Search directories, in lookup order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Register a definition embedded in a bag.
    ///
    /// Embedded definitions take precedence over anything loaded later from
    /// disk. Unsupported encodings and empty definitions are skipped with a
    /// warning so that lookup falls back to the search directories.
    pub fn add_definition(&mut self, type_name: &str, encoding: &str, definition: &str) {
        if definition.trim().is_empty() {
            debug!(type_name, "Bag carries no definition text");
            return;
        }

        match parse_schema_with_encoding_str(type_name, definition, encoding) {
            Ok(schema) => {
                for (name, msg_type) in schema.types {
                    self.types.insert(name, msg_type);
                }
            }
            Err(e) => {
                warn!(type_name, encoding, error = %e, "Ignoring embedded message definition");
            }
        }
    }

    /// Register an already-parsed type.
    pub fn insert(&mut self, msg_type: MessageType) {
        self.types.insert(msg_type.name.clone(), msg_type);
    }

    /// Look up a type by any accepted spelling.
    pub fn get(&self, type_name: &str) -> Option<&MessageType> {
        self.types
            .get(type_name)
            .or_else(|| self.types.get(&canonical_type_name(type_name)))
    }

    /// Check whether a type is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.get(type_name).is_some()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Make `type_name` and everything it references available.
    pub fn ensure_loaded(&mut self, type_name: &str) -> Result<()> {
        let mut pending = vec![canonical_type_name(type_name)];
        let mut visited = HashSet::new();

        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            if !self.types.contains_key(&name) {
                self.load(&name)?;
            }
            if let Some(msg_type) = self.types.get(&name) {
                pending.extend(
                    msg_type
                        .fields
                        .iter()
                        .filter_map(|f| f.type_name.nested_name())
                        .map(str::to_string),
                );
            }
        }

        Ok(())
    }

    /// Load one missing type from disk or the builtins.
    fn load(&mut self, name: &str) -> Result<()> {
        if let Some(path) = self.find_msg_file(name) {
            let text = fs::read_to_string(&path)?;
            let schema = parse_schema(name, &text)?;
            debug!(type_name = name, path = %path.display(), "Loaded message definition");
            for (type_name, msg_type) in schema.types {
                self.types.entry(type_name).or_insert(msg_type);
            }
            return Ok(());
        }

        if let Some(builtin) = builtin_types::get(name) {
            debug!(type_name = name, "Using builtin message definition");
            self.insert(builtin);
            return Ok(());
        }

        Err(BagError::type_not_found(name))
    }

    /// Locate `<dir>/share/<pkg>/msg/<Type>.msg` or `<dir>/<pkg>/msg/<Type>.msg`.
    fn find_msg_file(&self, name: &str) -> Option<PathBuf> {
        let (package, type_name) = split_msg_name(name)?;
        let file_name = format!("{type_name}.msg");

        self.search_paths.iter().find_map(|dir| {
            [
                dir.join("share").join(package).join("msg").join(&file_name),
                dir.join(package).join("msg").join(&file_name),
            ]
            .into_iter()
            .find(|candidate| candidate.is_file())
        })
    }
}

/// Split `pkg/msg/Type` into `(pkg, Type)`.
fn split_msg_name(name: &str) -> Option<(&str, &str)> {
    let mut parts = name.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(pkg), Some("msg"), Some(ty), None) => Some((pkg, ty)),
        _ => None,
    }
}

/// Install prefixes listed in `AMENT_PREFIX_PATH`, if set.
pub fn ament_prefix_paths() -> Vec<PathBuf> {
    std::env::var_os(AMENT_PREFIX_PATH)
        .map(|value| {
            std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Build the search path list from explicit directories plus, optionally,
/// the ament prefixes.
pub fn search_paths<P: AsRef<Path>>(explicit: &[P], use_ament_prefix_path: bool) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = explicit.iter().map(|p| p.as_ref().to_path_buf()).collect();
    if use_ament_prefix_path {
        paths.extend(ament_prefix_paths());
    }
    paths
}
