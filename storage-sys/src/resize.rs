// SPDX-License-Identifier: GPL-3.0-only

//! Partition table and filesystem growth
//!
//! The partition entry must be grown before the filesystem: both resize
//! tools only grow into block ranges that already belong to the partition.

use std::fmt;
use std::io;
use std::path::Path;

use storage_types::{DeviceId, ExpansionPlan, FilesystemKind};

use crate::command::{CommandOutput, CommandRunner, render};
use crate::config::ToolPaths;
use crate::{ExpandError, Result, mounts};

/// One fully specified tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn run<R: CommandRunner>(&self, runner: &R) -> io::Result<CommandOutput> {
        runner.run(&self.program, &self.args)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.program, &self.args))
    }
}

/// `parted` instruction moving the partition end to the end of the free space
pub fn partition_command(tools: &ToolPaths, plan: &ExpansionPlan) -> ToolCommand {
    ToolCommand::new(
        &tools.parted,
        [
            "-s".to_string(),
            "-a".to_string(),
            "optimal".to_string(),
            plan.request.id.parent.clone(),
            "resizepart".to_string(),
            plan.request.id.partition.to_string(),
            format!("{}B", plan.new_end()),
        ],
    )
}

/// Filesystem growth command for `kind`, or `None` when there is nothing
/// the helper can do for it.
///
/// Btrfs is grown through its mount point, so the mount table is consulted;
/// an unmounted btrfs cannot be grown.
pub fn filesystem_command(
    tools: &ToolPaths,
    kind: &FilesystemKind,
    id: &DeviceId,
    mounts_path: &Path,
) -> Result<Option<ToolCommand>> {
    match kind {
        FilesystemKind::Ext4 => Ok(Some(ToolCommand::new(
            &tools.resize2fs,
            [id.partition_path()],
        ))),
        FilesystemKind::Btrfs => {
            let device = id.partition_path();
            let command = render(&tools.btrfs, &["filesystem resize max".to_string()]);
            let mount_point = mounts::mount_point_for(mounts_path, &device)
                .map_err(|error| ExpandError::FilesystemResizeFailed {
                    command: command.clone(),
                    stderr: format!("cannot read {}: {error}", mounts_path.display()),
                })?
                .ok_or_else(|| ExpandError::FilesystemResizeFailed {
                    command,
                    stderr: format!("{device} is not mounted"),
                })?;

            Ok(Some(ToolCommand::new(
                &tools.btrfs,
                [
                    "filesystem".to_string(),
                    "resize".to_string(),
                    "max".to_string(),
                    mount_point.to_string_lossy().to_string(),
                ],
            )))
        }
        FilesystemKind::Unsupported(name) => {
            tracing::warn!(
                "No resize tool for filesystem '{}' on {}; leaving contents untouched",
                name,
                id.partition_path()
            );
            Ok(None)
        }
    }
}

/// Run the partition table edit. Failure is fatal for the whole expansion.
pub fn resize_partition<R: CommandRunner>(runner: &R, command: &ToolCommand) -> Result<()> {
    tracing::info!("Resizing partition: {command}");

    let output = command
        .run(runner)
        .map_err(|error| ExpandError::ResizeFailed {
            command: command.to_string(),
            stderr: error.to_string(),
        })?;

    if !output.success {
        return Err(ExpandError::ResizeFailed {
            command: command.to_string(),
            stderr: output.failure_reason(),
        });
    }
    Ok(())
}

/// Grow the filesystem; its regular output is discarded
pub fn resize_filesystem<R: CommandRunner>(runner: &R, command: &ToolCommand) -> Result<()> {
    tracing::info!("Resizing filesystem: {command}");

    let output = command
        .run(runner)
        .map_err(|error| ExpandError::FilesystemResizeFailed {
            command: command.to_string(),
            stderr: error.to_string(),
        })?;

    if !output.success {
        return Err(ExpandError::FilesystemResizeFailed {
            command: command.to_string(),
            stderr: output.failure_reason(),
        });
    }
    Ok(())
}
