//! Expansion request and plan

use serde::{Deserialize, Serialize};

use crate::{FilesystemKind, PartitionRecord};

/// A partition device split into its parent block device and index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceId {
    /// Parent block device (e.g., "/dev/nvme0n1")
    pub parent: String,

    /// Partition number (1-based)
    pub partition: u32,
}

impl DeviceId {
    /// Block device path of the partition itself.
    ///
    /// Parents whose name ends in a digit take a "p" separator
    /// (`/dev/mmcblk0` → `/dev/mmcblk0p2`), others take the number directly.
    pub fn partition_path(&self) -> String {
        let needs_p = self
            .parent
            .chars()
            .last()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false);
        if needs_p {
            format!("{}p{}", self.parent, self.partition)
        } else {
            format!("{}{}", self.parent, self.partition)
        }
    }
}

/// The device path the caller passed plus its resolved identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionRequest {
    pub device: String,
    pub id: DeviceId,
}

/// Everything needed to grow one partition; built once, consumed in order:
/// partition table entry first, filesystem second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionPlan {
    pub request: ExpansionRequest,
    pub target: PartitionRecord,
    pub free_space: PartitionRecord,
}

impl ExpansionPlan {
    pub fn free_bytes(&self) -> u64 {
        self.free_space.size
    }

    /// Offset the partition's end boundary moves to
    pub fn new_end(&self) -> u64 {
        self.free_space.end
    }

    pub fn filesystem(&self) -> FilesystemKind {
        FilesystemKind::from_parted(self.target.filesystem_type.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PartitionTableType;

    fn id(parent: &str, partition: u32) -> DeviceId {
        DeviceId {
            parent: parent.to_string(),
            partition,
        }
    }

    #[test]
    fn partition_path_uses_p_separator_after_digit() {
        assert_eq!(id("/dev/sda", 1).partition_path(), "/dev/sda1");
        assert_eq!(id("/dev/mmcblk0", 2).partition_path(), "/dev/mmcblk0p2");
        assert_eq!(id("/dev/nvme0n1", 3).partition_path(), "/dev/nvme0n1p3");
    }

    #[test]
    fn plan_exposes_new_end_and_filesystem() {
        let plan = ExpansionPlan {
            request: ExpansionRequest {
                device: "/dev/sda1".to_string(),
                id: id("/dev/sda", 1),
            },
            target: PartitionRecord {
                number: Some(1),
                start: 1_048_576,
                end: 10_485_759,
                size: 9_437_184,
                filesystem_type: Some("btrfs".to_string()),
                table_type: PartitionTableType::Gpt,
            },
            free_space: PartitionRecord::free_space(
                10_485_760,
                104_857_599,
                94_371_840,
                PartitionTableType::Gpt,
            ),
        };

        assert_eq!(plan.new_end(), 104_857_599);
        assert_eq!(plan.free_bytes(), 94_371_840);
        assert_eq!(plan.filesystem(), FilesystemKind::Btrfs);

        let json = serde_json::to_value(&plan.free_space.table_type).unwrap();
        assert_eq!(json, serde_json::json!("gpt"));
    }
}
