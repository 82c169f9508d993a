// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Convert command - dump one bag or a tree of bags to CSV.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::debug;

use crate::common::Result;
use rosbag2csv::layout::{BAG_DIR_NAME, CSV_DIR_NAME};
use rosbag2csv::{dump_with_progress, BagJob, DumpOptions, Layout};

/// Convert bags found at a path.
#[derive(Args, Clone, Debug)]
pub struct ConvertArgs {
    /// Path to a single ROS bag directory or root directory containing ros2bag folder
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Extra directory searched for .msg definitions (repeatable)
    #[arg(long = "msg-path", value_name = "DIR")]
    msg_paths: Vec<PathBuf>,

    /// Do not search the install prefixes in AMENT_PREFIX_PATH
    #[arg(long)]
    no_ament: bool,

    /// Use the union of every message's fields as the CSV header
    #[arg(long)]
    strict_columns: bool,

    /// TOML file with dump options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl ConvertArgs {
    pub fn run(self) -> Result<()> {
        let options = self.options()?;
        debug!(?options, "dump options");

        let layout = Layout::resolve(&self.input)?;
        match &layout {
            Layout::Single { .. } => {}
            Layout::Structured { bags, .. } => {
                println!("Found {} ROS bag(s) to process\n", bags.len());
            }
            Layout::Discovered { root, bags, .. } => {
                println!("Found {} ROS bag(s) in {}", bags.len(), root.display());
                println!(
                    "Note: No '{BAG_DIR_NAME}' folder found. \
                     Creating '{CSV_DIR_NAME}' folder in same location.\n"
                );
            }
        }

        for job in layout.jobs() {
            process_bag(&job, &options)?;
        }

        if layout.is_multi() {
            println!("✓ All bags processed successfully!");
        }
        Ok(())
    }

    /// Config file values overridden by command-line flags.
    fn options(&self) -> Result<DumpOptions> {
        let mut options = match &self.config {
            Some(path) => DumpOptions::from_toml_file(path)?,
            None => DumpOptions::default(),
        };

        let mut msg_paths = self.msg_paths.clone();
        msg_paths.append(&mut options.msg_paths);
        options.msg_paths = msg_paths;

        if self.no_ament {
            options.use_ament_prefix_path = false;
        }
        if self.strict_columns {
            options.strict_columns = true;
        }
        Ok(options)
    }
}

/// Dump one bag with console progress.
fn process_bag(job: &BagJob, options: &DumpOptions) -> Result<()> {
    println!("Processing: {}", job.bag.display());
    let stats = dump_with_progress(&job.bag, &job.output, options, |t| {
        println!("  {t:5.3}s");
    })
    .with_context(|| format!("Failed to convert {}", job.bag.display()))?;
    println!(
        "  ✓ Created {} CSV file(s) in {}\n",
        stats.topic_count,
        job.output.display()
    );
    Ok(())
}
