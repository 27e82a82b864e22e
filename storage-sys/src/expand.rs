// SPDX-License-Identifier: GPL-3.0-only

//! Query and expand pipelines
//!
//! Both start with Resolve → Inspect → Locate. Expand then re-checks policy
//! and runs ResizePartitionTable → ResizeFilesystem. The first failing step
//! ends the run; nothing is retried or rolled back. If the filesystem step
//! fails the partition stays grown and a second run finds no free space, so
//! callers must track that state from the exit code.

use storage_types::{ExpansionPlan, ExpansionRequest, PartitionRecord, bytes_to_pretty};

use crate::command::CommandRunner;
use crate::config::ExpandConfig;
use crate::resize::{self, ToolCommand};
use crate::{Result, device, locate, parted};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandOptions {
    /// Plan and print the resize commands without running them
    pub dry_run: bool,
}

/// What an expand run did (or would have done)
#[derive(Debug, Clone)]
pub struct ExpandOutcome {
    pub plan: ExpansionPlan,
    pub commands: Vec<ToolCommand>,
    pub executed: bool,
}

pub struct Expander<R> {
    runner: R,
    config: ExpandConfig,
}

impl<R: CommandRunner> Expander<R> {
    pub fn new(runner: R, config: ExpandConfig) -> Self {
        Self { runner, config }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Current layout of `parent`, read fresh from parted
    pub fn inspect(&self, parent: &str) -> Result<Vec<PartitionRecord>> {
        parted::inspect(&self.runner, &self.config.tools.parted, parent)
    }

    /// Resolve → Inspect → Locate
    pub fn plan(&self, device: &str) -> Result<ExpansionPlan> {
        let id = device::resolve(device)?;
        tracing::debug!(
            "Resolved {} to partition {} of {}",
            device,
            id.partition,
            id.parent
        );

        let records = self.inspect(&id.parent)?;
        let (target, free_space) = locate::locate(&records, &id.parent, id.partition)?;

        Ok(ExpansionPlan {
            request: ExpansionRequest {
                device: device.to_string(),
                id,
            },
            target,
            free_space,
        })
    }

    /// Plan for `device`; the caller reports `free_bytes()`
    pub fn query_expandable(&self, device: &str) -> Result<ExpansionPlan> {
        let plan = self.plan(device)?;
        tracing::info!(
            "{} can grow by {}",
            device,
            bytes_to_pretty(&plan.free_bytes(), true)
        );
        Ok(plan)
    }

    /// Grow the partition table entry, then the filesystem
    pub fn expand(&self, device: &str, options: ExpandOptions) -> Result<ExpandOutcome> {
        let plan = self.plan(device)?;
        locate::validate_policy(&plan)?;

        let partition = resize::partition_command(&self.config.tools, &plan);
        let filesystem = resize::filesystem_command(
            &self.config.tools,
            &plan.filesystem(),
            &plan.request.id,
            &self.config.mounts_path,
        )?;

        let mut commands = vec![partition];
        commands.extend(filesystem);

        if options.dry_run {
            tracing::info!("Dry run for {}: {} command(s) planned", device, commands.len());
            return Ok(ExpandOutcome {
                plan,
                commands,
                executed: false,
            });
        }

        resize::resize_partition(&self.runner, &commands[0])?;
        if let Some(command) = commands.get(1) {
            resize::resize_filesystem(&self.runner, command)?;
        }

        tracing::info!(
            "Expanded {} by {} to end at byte {}",
            device,
            bytes_to_pretty(&plan.free_bytes(), true),
            plan.new_end()
        );

        Ok(ExpandOutcome {
            plan,
            commands,
            executed: true,
        })
    }
}
