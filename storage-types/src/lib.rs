// SPDX-License-Identifier: GPL-3.0-only

//! Domain models for partition expansion
//!
//! These types are rebuilt from live partitioning tool output on every
//! invocation and are never persisted:
//!
//! - `PartitionRecord` → one line of the partition layout, either a real
//!   partition or an unallocated byte range
//! - `PartitionTableType` → the label type the records were read from
//! - `FilesystemKind` → the closed set of filesystems the helper can grow
//! - `ExpansionPlan` → target partition plus the free space it will absorb

pub mod common;
pub mod expansion;
pub mod filesystem;
pub mod partition;

pub use common::{MIB, MIN_FREE_SPACE_BYTES, bytes_to_pretty};
pub use expansion::{DeviceId, ExpansionPlan, ExpansionRequest};
pub use filesystem::FilesystemKind;
pub use partition::{PartitionRecord, PartitionTableType};
