// SPDX-License-Identifier: GPL-3.0-only

//! Mount table lookup

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Decode the octal escapes the kernel uses for whitespace and backslashes
/// in mount table fields (`\040` for a space).
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;

    while index < bytes.len() {
        if bytes[index] == b'\\'
            && index + 3 < bytes.len()
            && bytes[index + 1..index + 4].iter().all(|b| (b'0'..=b'7').contains(b))
        {
            let value = bytes[index + 1..index + 4]
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            if let Ok(byte) = u8::try_from(value) {
                decoded.push(byte);
                index += 4;
                continue;
            }
        }
        decoded.push(bytes[index]);
        index += 1;
    }

    String::from_utf8_lossy(&decoded).to_string()
}

fn same_device(source: &str, device: &str) -> bool {
    if source == device {
        return true;
    }
    if !source.starts_with('/') {
        return false;
    }
    match (fs::canonicalize(source), fs::canonicalize(device)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

/// First mount point of `device` in a `/proc/self/mounts` formatted table
pub fn find_mount_point(table: &str, device: &str) -> Option<PathBuf> {
    table
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            Some((fields.next()?, fields.next()?))
        })
        .find(|(source, _)| same_device(&unescape(source), device))
        .map(|(_, target)| PathBuf::from(unescape(target)))
}

/// Read the mount table at `mounts_path` and look up `device`
pub fn mount_point_for(mounts_path: &Path, device: &str) -> io::Result<Option<PathBuf>> {
    let table = fs::read_to_string(mounts_path)?;
    Ok(find_mount_point(&table, device))
}
