// SPDX-License-Identifier: GPL-3.0-only

//! Partition device path resolution

use storage_types::DeviceId;

use crate::{ExpandError, Result};

/// Split a path into its non-empty prefix and non-empty trailing digit run
fn split_trailing_digits(path: &str) -> Option<(&str, &str)> {
    let prefix = path.trim_end_matches(|c: char| c.is_ascii_digit());
    if prefix.is_empty() || prefix.len() == path.len() {
        return None;
    }
    Some((prefix, &path[prefix.len()..]))
}

fn ends_with_letter(s: &str) -> bool {
    s.chars().last().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Split a partition device path into parent device and partition number.
///
/// `<name ending in letter+digits>p<digits>` splits at the `p`
/// (`/dev/nvme0n1p2`, `/dev/mmcblk0p1`); otherwise
/// `<name ending in letter><digits>` splits before the digits (`/dev/sda1`).
/// Whole-disk paths such as `/dev/sda` are rejected.
pub fn resolve(device: &str) -> Result<DeviceId> {
    let invalid = || ExpandError::InvalidDevice(device.to_string());
    let (prefix, digits) = split_trailing_digits(device).ok_or_else(invalid)?;

    let parent = match prefix.strip_suffix('p') {
        Some(before)
            if split_trailing_digits(before).is_some_and(|(name, _)| ends_with_letter(name)) =>
        {
            before
        }
        _ if ends_with_letter(prefix) => prefix,
        _ => return Err(invalid()),
    };

    let partition: u32 = digits.parse().map_err(|_| invalid())?;
    if partition == 0 {
        return Err(invalid());
    }

    Ok(DeviceId {
        parent: parent.to_string(),
        partition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(device: &str) -> (String, u32) {
        let id = resolve(device).unwrap();
        (id.parent, id.partition)
    }

    #[test]
    fn splits_directly_numbered_devices() {
        assert_eq!(split("/dev/sda1"), ("/dev/sda".to_string(), 1));
        assert_eq!(split("/dev/vdb12"), ("/dev/vdb".to_string(), 12));
        assert_eq!(split("/dev/xvda3"), ("/dev/xvda".to_string(), 3));
    }

    #[test]
    fn splits_at_p_when_parent_ends_in_digit() {
        assert_eq!(split("/dev/nvme0n1p2"), ("/dev/nvme0n1".to_string(), 2));
        assert_eq!(split("/dev/mmcblk0p1"), ("/dev/mmcblk0".to_string(), 1));
        assert_eq!(split("/dev/loop7p10"), ("/dev/loop7".to_string(), 10));
    }

    #[test]
    fn disk_named_with_trailing_p_is_direct() {
        assert_eq!(split("/dev/sdp1"), ("/dev/sdp".to_string(), 1));
    }

    #[test]
    fn rejects_whole_disks_and_garbage() {
        for device in ["/dev/sda", "", "12", "/dev/", "/dev/sda0", "/dev/sd-1"] {
            assert!(
                matches!(resolve(device), Err(ExpandError::InvalidDevice(_))),
                "{device} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        assert!(resolve("/dev/sda99999999999").is_err());
    }

    #[test]
    fn round_trips_through_partition_path() {
        for device in ["/dev/sda1", "/dev/nvme0n1p2", "/dev/mmcblk0p1"] {
            assert_eq!(resolve(device).unwrap().partition_path(), device);
        }
    }
}
