//! Filesystems the helper knows how to grow

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of filesystem kinds, dispatched exhaustively by the resizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilesystemKind {
    /// Grown offline or online through its block device
    Ext4,

    /// Grown through its mount point
    Btrfs,

    /// Anything else, including an undetected filesystem
    Unsupported(String),
}

impl FilesystemKind {
    /// Classify the filesystem column of a partition record
    pub fn from_parted(fs_type: Option<&str>) -> Self {
        match fs_type {
            Some("ext4") => Self::Ext4,
            Some("btrfs") => Self::Btrfs,
            Some(other) => Self::Unsupported(other.to_string()),
            None => Self::Unsupported(String::new()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for FilesystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ext4 => f.write_str("ext4"),
            Self::Btrfs => f.write_str("btrfs"),
            Self::Unsupported(name) if name.is_empty() => f.write_str("unknown"),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_parted_filesystem_column() {
        assert_eq!(FilesystemKind::from_parted(Some("ext4")), FilesystemKind::Ext4);
        assert_eq!(FilesystemKind::from_parted(Some("btrfs")), FilesystemKind::Btrfs);
        assert_eq!(
            FilesystemKind::from_parted(Some("xfs")),
            FilesystemKind::Unsupported("xfs".to_string())
        );
        assert!(!FilesystemKind::from_parted(None).is_supported());
        assert_eq!(FilesystemKind::from_parted(None).to_string(), "unknown");
    }
}
