// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Input layouts.
//!
//! One input path is interpreted in this order:
//!
//! 1. The path is itself a bag: CSV files go next to it.
//! 2. The path has a `ros2bag/` folder: bags below it are mirrored into a
//!    sibling `csv/` folder.
//! 3. Bags exist anywhere below the path: they are mirrored into `csv/`
//!    inside the path.
//!
//! Otherwise resolution fails with [`BagError::NoBagsFound`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{BagError, Result};
use crate::discovery::{find_bags, is_bag};

/// Folder holding the bags in a structured project.
pub const BAG_DIR_NAME: &str = "ros2bag";

/// Folder receiving the CSV tree.
pub const CSV_DIR_NAME: &str = "csv";

/// One bag to convert and where its CSV files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagJob {
    /// Bag directory
    pub bag: PathBuf,
    /// Output directory for the bag's CSV files
    pub output: PathBuf,
}

/// How an input path was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// The input is a bag
    Single {
        /// Bag directory, also the output directory
        bag: PathBuf,
    },
    /// The input is a project with a `ros2bag/` folder
    Structured {
        /// Project root
        root: PathBuf,
        /// `root/ros2bag`
        bag_root: PathBuf,
        /// `root/csv`
        output_root: PathBuf,
        /// Bags under `bag_root`, sorted
        bags: Vec<PathBuf>,
    },
    /// Bags were found somewhere below the input
    Discovered {
        /// The input directory
        root: PathBuf,
        /// `root/csv`
        output_root: PathBuf,
        /// Bags under `root`, sorted
        bags: Vec<PathBuf>,
    },
}

impl Layout {
    /// Interpret `input`.
    ///
    /// Creates the `csv/` output root for the multi-bag layouts.
    pub fn resolve(input: impl AsRef<Path>) -> Result<Self> {
        let input = input.as_ref();
        if !input.exists() {
            return Err(BagError::path_not_found(input));
        }
        if !input.is_dir() {
            return Err(BagError::not_a_directory(input));
        }

        if is_bag(input) {
            debug!(input = %input.display(), "input is a single bag");
            return Ok(Layout::Single {
                bag: input.to_path_buf(),
            });
        }

        let bag_root = input.join(BAG_DIR_NAME);
        if bag_root.exists() {
            if !bag_root.is_dir() {
                return Err(BagError::MissingBagRoot {
                    path: input.to_path_buf(),
                    dir_name: BAG_DIR_NAME,
                });
            }
            let output_root = input.join(CSV_DIR_NAME);
            fs::create_dir_all(&output_root)?;

            let bags = find_bags(&bag_root)?;
            if bags.is_empty() {
                return Err(BagError::no_bags_found(&bag_root));
            }
            debug!(count = bags.len(), "structured layout");
            return Ok(Layout::Structured {
                root: input.to_path_buf(),
                bag_root,
                output_root,
                bags,
            });
        }

        let bags = find_bags(input)?;
        if bags.is_empty() {
            return Err(BagError::no_bags_found(input));
        }
        let output_root = input.join(CSV_DIR_NAME);
        fs::create_dir_all(&output_root)?;
        debug!(count = bags.len(), "discovered layout");
        Ok(Layout::Discovered {
            root: input.to_path_buf(),
            output_root,
            bags,
        })
    }

    /// Bags in processing order.
    pub fn bags(&self) -> &[PathBuf] {
        match self {
            Layout::Single { bag } => std::slice::from_ref(bag),
            Layout::Structured { bags, .. } | Layout::Discovered { bags, .. } => bags,
        }
    }

    /// Whether more than one bag may be processed.
    pub fn is_multi(&self) -> bool {
        !matches!(self, Layout::Single { .. })
    }

    /// Pair every bag with its output directory.
    ///
    /// Multi-bag layouts mirror the bag's path relative to the search root
    /// under the output root.
    pub fn jobs(&self) -> Vec<BagJob> {
        match self {
            Layout::Single { bag } => vec![BagJob {
                bag: bag.clone(),
                output: bag.clone(),
            }],
            Layout::Structured {
                bag_root,
                output_root,
                bags,
                ..
            } => mirror(bags, bag_root, output_root),
            Layout::Discovered {
                root,
                output_root,
                bags,
            } => mirror(bags, root, output_root),
        }
    }
}

fn mirror(bags: &[PathBuf], search_root: &Path, output_root: &Path) -> Vec<BagJob> {
    bags.iter()
        .map(|bag| {
            let relative = bag.strip_prefix(search_root).unwrap_or(bag.as_path());
            BagJob {
                bag: bag.clone(),
                output: output_root.join(relative),
            }
        })
        .collect()
}
