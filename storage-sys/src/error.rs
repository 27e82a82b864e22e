// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Which entry point an error surfaced from; exit codes differ per operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    QueryExpandable,
    Expand,
}

/// Why a partition was refused by policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    /// Logical partition inside an msdos extended partition
    LogicalPartition { number: u32 },

    /// Filesystem the helper cannot grow
    Filesystem(String),
}

impl std::fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LogicalPartition { number } => {
                write!(f, "partition {number} is a logical partition")
            }
            Self::Filesystem(fs) => write!(f, "filesystem '{fs}' cannot be resized"),
        }
    }
}

/// Error taxonomy of the expansion engine. Every variant is terminal.
#[derive(Error, Debug)]
pub enum ExpandError {
    #[error("Invalid device '{0}': expected a partition device path")]
    InvalidDevice(String),

    #[error("{command} failed: {reason}")]
    ToolInvocation { command: String, reason: String },

    #[error("Unsupported unit in partition listing: '{0}'")]
    UnsupportedUnit(String),

    #[error("Not supported: {0}")]
    Unsupported(PolicyViolation),

    #[error("Partition {number} not found on {parent}")]
    PartitionNotFound { parent: String, number: u32 },

    #[error("No adjacent free space of at least {min_bytes} bytes after partition {number}")]
    NoFreeSpace { number: u32, min_bytes: u64 },

    #[error("Partition resize failed: {command}: {stderr}")]
    ResizeFailed { command: String, stderr: String },

    #[error("Filesystem resize failed: {command}: {stderr}")]
    FilesystemResizeFailed { command: String, stderr: String },
}

impl ExpandError {
    /// Process exit code handed back to the dispatcher
    pub fn exit_code(&self, operation: Operation) -> u8 {
        match self {
            Self::InvalidDevice(_) => 1,
            Self::ToolInvocation { .. }
            | Self::UnsupportedUnit(_)
            | Self::PartitionNotFound { .. } => 2,
            Self::Unsupported(PolicyViolation::LogicalPartition { .. }) => match operation {
                Operation::QueryExpandable => 3,
                Operation::Expand => 4,
            },
            Self::Unsupported(PolicyViolation::Filesystem(_)) => 4,
            Self::NoFreeSpace { .. } | Self::ResizeFailed { .. } => 5,
            Self::FilesystemResizeFailed { .. } => 6,
        }
    }
}

/// Result type alias for expansion operations
pub type Result<T> = std::result::Result<T, ExpandError>;
