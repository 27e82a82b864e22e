// SPDX-License-Identifier: GPL-3.0-only

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde::Serialize;
use storage_sys::{
    CommandRunner, ExpandConfig, ExpandError, ExpandOptions, Expander, Operation, SystemRunner,
};
use storage_types::ExpansionPlan;

mod logging;

/// Exit code for failures before the partition table could be inspected
const SETUP_FAILURE_CODE: u8 = 2;

/// Exit code for malformed arguments; no device could be resolved
const USAGE_FAILURE_CODE: u8 = 1;

/// Privileged helper that grows a partition and its filesystem into the
/// free space directly after it
#[derive(Parser)]
#[command(name = "storage-expand-helper")]
#[command(about = "Privileged helper for growing appliance storage partitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print how many bytes of adjacent free space the partition can absorb
    IsPartitionExpandable {
        /// Partition device path (e.g. /dev/sda2, /dev/nvme0n1p3)
        device: String,
        /// Print a JSON object instead of the bare byte count
        #[arg(long)]
        json: bool,
    },
    /// Grow the partition into adjacent free space, then grow its filesystem
    ExpandPartition {
        /// Partition device path (e.g. /dev/sda2, /dev/nvme0n1p3)
        device: String,
        /// Print the resize commands without running them
        #[arg(long)]
        dry_run: bool,
    },
}

impl Commands {
    fn operation(&self) -> Operation {
        match self {
            Self::IsPartitionExpandable { .. } => Operation::QueryExpandable,
            Self::ExpandPartition { .. } => Operation::Expand,
        }
    }

    /// Only a real expand writes to the disk
    fn writes_to_disk(&self) -> bool {
        matches!(self, Self::ExpandPartition { dry_run: false, .. })
    }
}

/// JSON form of the expandable query
#[derive(Debug, Serialize)]
struct ExpandableOutput {
    device: String,
    parent: String,
    partition: u32,
    free_space_start: u64,
    free_space_end: u64,
    free_bytes: u64,
}

impl From<&ExpansionPlan> for ExpandableOutput {
    fn from(plan: &ExpansionPlan) -> Self {
        Self {
            device: plan.request.device.clone(),
            parent: plan.request.id.parent.clone(),
            partition: plan.request.id.partition,
            free_space_start: plan.free_space.start,
            free_space_end: plan.free_space.end,
            free_bytes: plan.free_bytes(),
        }
    }
}

/// Help and version requests succeed; every other usage error is code 1
fn usage_exit_code(error: &clap::Error) -> u8 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => USAGE_FAILURE_CODE,
    }
}

/// A real expand needs root; queries and dry runs only read the layout
fn require_root(command: &Commands, euid: u32) -> std::result::Result<(), ExpandError> {
    if euid != 0 && command.writes_to_disk() {
        return Err(ExpandError::ResizeFailed {
            command: "expand-partition".to_string(),
            stderr: format!("must run as root (effective uid {euid})"),
        });
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    let config = match ExpandConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(SETUP_FAILURE_CODE);
        }
    };
    logging::init(&config);

    let operation = cli.command.operation();
    let euid = unsafe { libc::geteuid() };
    if let Err(e) = require_root(&cli.command, euid) {
        tracing::error!("Refusing to expand without root privileges");
        eprintln!("error: {e}");
        return ExitCode::from(e.exit_code(operation));
    }
    if euid != 0 {
        tracing::warn!("Not running as root; parted may be unable to read the disk");
    }

    let expander = Expander::new(SystemRunner, config);
    let mut stdout = io::stdout().lock();

    match run(&expander, cli.command, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("error: {e}");
            ExitCode::from(exit_code(&e, operation))
        }
    }
}

fn exit_code(error: &anyhow::Error, operation: Operation) -> u8 {
    error
        .downcast_ref::<ExpandError>()
        .map(|e| e.exit_code(operation))
        .unwrap_or(SETUP_FAILURE_CODE)
}

fn run<R: CommandRunner>(
    expander: &Expander<R>,
    command: Commands,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::IsPartitionExpandable { device, json } => {
            let plan = expander.query_expandable(&device)?;
            if json {
                let output = serde_json::to_string(&ExpandableOutput::from(&plan))?;
                writeln!(out, "{}", output)?;
            } else {
                writeln!(out, "{}", plan.free_bytes())?;
            }
        }
        Commands::ExpandPartition { device, dry_run } => {
            let outcome = expander.expand(&device, ExpandOptions { dry_run })?;
            if !outcome.executed {
                for command in &outcome.commands {
                    writeln!(out, "{}", command)?;
                }
            }
        }
    }

    Ok(())
}
