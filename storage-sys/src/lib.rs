// SPDX-License-Identifier: GPL-3.0-only

//! Partition and filesystem expansion engine
//!
//! Grows a partition into the free space that directly follows it, then
//! grows the filesystem inside it:
//!
//! - `device`: split a partition path into parent disk and index
//! - `parted`: run `parted` and translate its machine-readable listing
//! - `locate`: pick the adjacent free region worth absorbing
//! - `resize`: move the partition end, then grow ext4 or btrfs
//! - `expand`: the query and expand pipelines over the steps above
//!
//! Every operation here is destructive on live storage and must only run
//! from the privileged helper.

pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod expand;
pub mod locate;
pub mod mounts;
pub mod parted;
pub mod resize;

pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use config::{ExpandConfig, ToolPaths};
pub use error::{ExpandError, Operation, PolicyViolation, Result};
pub use expand::{ExpandOptions, ExpandOutcome, Expander};
