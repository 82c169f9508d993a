// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # rosbag2csv CLI
//!
//! Convert ROS 2 bags into one CSV file per topic.
//!
//! ## Usage
//!
//! ```sh
//! # Convert a single bag; CSV files land next to it
//! rosbag2csv /path/to/single/rosbag
//!
//! # Convert every bag of a project with ros2bag/ and csv/ folders
//! rosbag2csv /path/to/project
//! ```

mod cmd;
mod common;

use std::process;

use clap::Parser;
use cmd::ConvertArgs;
use common::Result;
use rosbag2csv::BagError;

/// rosbag2csv - Convert ROS 2 bag files to CSV format
#[derive(Parser, Clone, Debug)]
#[command(name = "rosbag2csv")]
#[command(about = "Convert ROS 2 bag files to CSV format", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
#[command(after_help = "\
The structured mode expects:
  project/
    ros2bag/
      config1/
        trial_1/  (rosbag)
        trial_2/  (rosbag)
      config2/
        trial_1/  (rosbag)
    csv/         (created automatically with same structure)")]
struct Cli {
    #[command(flatten)]
    convert: ConvertArgs,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    common::init_logging(cli.verbose);
    cli.convert.run()
}

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<BagError>() {
            // Input problems get the bare message and what to fix
            Some(err) if err.is_input_error() => {
                eprintln!("Error: {err}");
                if let Some(hint) = err.hint() {
                    eprintln!("{hint}");
                }
            }
            _ => eprintln!("Error: {e:#}"),
        }
        process::exit(1);
    }
}
