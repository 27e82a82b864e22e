// SPDX-License-Identifier: GPL-3.0-only

//! Adjacent free-space selection and expansion policy

use storage_types::{ExpansionPlan, MIN_FREE_SPACE_BYTES, PartitionRecord};

use crate::{ExpandError, PolicyViolation, Result};

/// Refuse logical partitions of msdos labels
fn reject_logical(target: &PartitionRecord, number: u32) -> Result<()> {
    if target.table_type.is_logical_partition(number) {
        return Err(ExpandError::Unsupported(PolicyViolation::LogicalPartition {
            number,
        }));
    }
    Ok(())
}

/// Find partition `number` and the free region that starts on the byte
/// right after it and holds at least `MIN_FREE_SPACE_BYTES`.
///
/// If several regions qualify the last one listed is returned; parted never
/// reports two free regions at the same offset, so in practice there is at
/// most one.
pub fn locate(
    records: &[PartitionRecord],
    parent: &str,
    number: u32,
) -> Result<(PartitionRecord, PartitionRecord)> {
    let target = records
        .iter()
        .find(|record| record.number == Some(number))
        .ok_or_else(|| ExpandError::PartitionNotFound {
            parent: parent.to_string(),
            number,
        })?;

    reject_logical(target, number)?;

    let free_space = records
        .iter()
        .rev()
        .find(|record| {
            record.is_free_space()
                && target.is_followed_by(record)
                && record.size >= MIN_FREE_SPACE_BYTES
        })
        .ok_or(ExpandError::NoFreeSpace {
            number,
            min_bytes: MIN_FREE_SPACE_BYTES,
        })?;

    tracing::debug!(
        "Partition {} of {} ends at {}, free space {}..={} ({} bytes)",
        number,
        parent,
        target.end,
        free_space.start,
        free_space.end,
        free_space.size
    );

    Ok((target.clone(), free_space.clone()))
}

/// Checks run before anything is written: the logical-partition rule again
/// and the filesystem kind, which must be one the resizer can grow.
pub fn validate_policy(plan: &ExpansionPlan) -> Result<()> {
    reject_logical(&plan.target, plan.request.id.partition)?;

    let filesystem = plan.filesystem();
    if !filesystem.is_supported() {
        return Err(ExpandError::Unsupported(PolicyViolation::Filesystem(
            filesystem.to_string(),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use storage_types::{DeviceId, ExpansionRequest, MIB, PartitionTableType};

    use super::*;

    fn partition(number: u32, start: u64, end: u64, table: PartitionTableType) -> PartitionRecord {
        PartitionRecord {
            number: Some(number),
            start,
            end,
            size: end - start + 1,
            filesystem_type: Some("ext4".to_string()),
            table_type: table,
        }
    }

    fn free(start: u64, size: u64) -> PartitionRecord {
        PartitionRecord::free_space(start, start + size - 1, size, PartitionTableType::Gpt)
    }

    #[test]
    fn picks_only_region_above_threshold() {
        let records = vec![
            partition(1, 1024, 2047, PartitionTableType::Gpt),
            free(2048, 5 * MIB),
            free(2048, 20 * MIB),
        ];

        let (target, free_space) = locate(&records, "/dev/sda", 1).unwrap();
        assert_eq!(target.number, Some(1));
        assert_eq!(free_space.size, 20 * MIB);
    }

    #[test]
    fn last_qualifying_region_wins() {
        let records = vec![
            partition(1, 1024, 2047, PartitionTableType::Gpt),
            free(2048, 20 * MIB),
            free(2048, 30 * MIB),
        ];

        let (_, free_space) = locate(&records, "/dev/sda", 1).unwrap();
        assert_eq!(free_space.size, 30 * MIB);
    }

    #[test]
    fn threshold_is_inclusive() {
        let records = vec![
            partition(1, 1024, 2047, PartitionTableType::Gpt),
            free(2048, MIN_FREE_SPACE_BYTES),
        ];
        assert!(locate(&records, "/dev/sda", 1).is_ok());
    }

    #[test]
    fn gap_or_preceding_space_does_not_qualify() {
        let records = vec![
            free(0, 20 * MIB),
            partition(1, 20 * MIB, 40 * MIB - 1, PartitionTableType::Gpt),
            free(40 * MIB + 512, 20 * MIB),
        ];

        assert!(matches!(
            locate(&records, "/dev/sda", 1),
            Err(ExpandError::NoFreeSpace { number: 1, .. })
        ));
    }

    #[test]
    fn space_after_another_partition_is_ignored() {
        let records = vec![
            partition(1, 1024, 2047, PartitionTableType::Gpt),
            partition(2, 2048, 4095, PartitionTableType::Gpt),
            free(4096, 20 * MIB),
        ];

        assert!(matches!(
            locate(&records, "/dev/sda", 1),
            Err(ExpandError::NoFreeSpace { .. })
        ));
        assert!(locate(&records, "/dev/sda", 2).is_ok());
    }

    #[test]
    fn missing_partition_is_reported() {
        let records = vec![partition(1, 1024, 2047, PartitionTableType::Gpt)];
        assert!(matches!(
            locate(&records, "/dev/sda", 3),
            Err(ExpandError::PartitionNotFound { number: 3, .. })
        ));
    }

    #[test]
    fn logical_msdos_partitions_are_rejected() {
        let records = vec![
            partition(6, 1024, 2047, PartitionTableType::Msdos),
            free(2048, 20 * MIB),
        ];

        assert!(matches!(
            locate(&records, "/dev/sda", 6),
            Err(ExpandError::Unsupported(PolicyViolation::LogicalPartition { number: 6 }))
        ));
    }

    #[test]
    fn high_numbers_are_fine_on_gpt() {
        let records = vec![
            partition(6, 1024, 2047, PartitionTableType::Gpt),
            free(2048, 20 * MIB),
        ];
        assert!(locate(&records, "/dev/sda", 6).is_ok());
    }

    fn plan_with(fs: Option<&str>, number: u32, table: PartitionTableType) -> ExpansionPlan {
        let mut target = partition(number, 1024, 2047, table.clone());
        target.filesystem_type = fs.map(ToString::to_string);
        ExpansionPlan {
            request: ExpansionRequest {
                device: format!("/dev/sda{number}"),
                id: DeviceId {
                    parent: "/dev/sda".to_string(),
                    partition: number,
                },
            },
            target,
            free_space: free(2048, 20 * MIB),
        }
    }

    #[test]
    fn policy_accepts_ext4_and_btrfs() {
        assert!(validate_policy(&plan_with(Some("ext4"), 1, PartitionTableType::Msdos)).is_ok());
        assert!(validate_policy(&plan_with(Some("btrfs"), 2, PartitionTableType::Gpt)).is_ok());
    }

    #[test]
    fn policy_rejects_other_filesystems() {
        for fs in [Some("xfs"), Some("fat32"), None] {
            assert!(matches!(
                validate_policy(&plan_with(fs, 1, PartitionTableType::Gpt)),
                Err(ExpandError::Unsupported(PolicyViolation::Filesystem(_)))
            ));
        }
    }

    #[test]
    fn policy_rejects_logical_partitions() {
        assert!(matches!(
            validate_policy(&plan_with(Some("ext4"), 5, PartitionTableType::Msdos)),
            Err(ExpandError::Unsupported(PolicyViolation::LogicalPartition { number: 5 }))
        ));
    }
}
