//! Partition layout records as reported by the partitioning tool

use std::fmt;

use serde::{Deserialize, Serialize};

/// Partition table (disk label) type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionTableType {
    /// MBR/DOS label
    Msdos,

    /// GPT (GUID Partition Table)
    Gpt,

    /// Any other label parted knows about (e.g. "loop", "sun")
    Other(String),
}

impl PartitionTableType {
    /// Parse the label field of parted's device line
    pub fn parse(s: &str) -> Self {
        match s {
            "msdos" | "dos" => Self::Msdos,
            "gpt" => Self::Gpt,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Msdos => "msdos",
            Self::Gpt => "gpt",
            Self::Other(name) => name,
        }
    }

    /// Logical partitions (number >= 5) live in an extended partition's
    /// nested table on msdos labels.
    pub fn is_logical_partition(&self, number: u32) -> bool {
        matches!(self, Self::Msdos) && number >= 5
    }
}

impl fmt::Display for PartitionTableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the partition layout: either a partition or a free region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRecord {
    /// Partition number (None for free space)
    pub number: Option<u32>,

    /// First byte (inclusive)
    pub start: u64,

    /// Last byte (inclusive)
    pub end: u64,

    /// Size in bytes
    pub size: u64,

    /// Filesystem type as reported by parted (None for free space or unknown)
    pub filesystem_type: Option<String>,

    /// Label type of the table this record was read from
    pub table_type: PartitionTableType,
}

impl PartitionRecord {
    /// Build a free-space record
    pub fn free_space(start: u64, end: u64, size: u64, table_type: PartitionTableType) -> Self {
        Self {
            number: None,
            start,
            end,
            size,
            filesystem_type: None,
            table_type,
        }
    }

    pub fn is_free_space(&self) -> bool {
        self.number.is_none()
    }

    /// Whether `other` begins on the byte right after this record ends
    pub fn is_followed_by(&self, other: &PartitionRecord) -> bool {
        self.end.checked_add(1) == Some(other.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_table_types() {
        assert_eq!(PartitionTableType::parse("msdos"), PartitionTableType::Msdos);
        assert_eq!(PartitionTableType::parse("gpt"), PartitionTableType::Gpt);
        assert_eq!(
            PartitionTableType::parse("loop"),
            PartitionTableType::Other("loop".to_string())
        );
        assert_eq!(PartitionTableType::Other("sun".into()).to_string(), "sun");
    }

    #[test]
    fn logical_partitions_only_exist_on_msdos() {
        assert!(PartitionTableType::Msdos.is_logical_partition(5));
        assert!(!PartitionTableType::Msdos.is_logical_partition(4));
        assert!(!PartitionTableType::Gpt.is_logical_partition(6));
    }

    #[test]
    fn adjacency_is_byte_exact() {
        let partition = PartitionRecord {
            number: Some(1),
            start: 1_048_576,
            end: 10_485_759,
            size: 9_437_184,
            filesystem_type: Some("ext4".to_string()),
            table_type: PartitionTableType::Msdos,
        };
        let adjacent =
            PartitionRecord::free_space(10_485_760, 104_857_599, 94_371_840, PartitionTableType::Msdos);
        let gapped =
            PartitionRecord::free_space(10_485_761, 104_857_599, 94_371_839, PartitionTableType::Msdos);

        assert!(adjacent.is_free_space());
        assert!(partition.is_followed_by(&adjacent));
        assert!(!partition.is_followed_by(&gapped));
    }
}
