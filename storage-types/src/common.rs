//! Common constants and formatting helpers

use num_format::{Locale, ToFormattedString};

/// One mebibyte
pub const MIB: u64 = 1024 * 1024;

/// Free space smaller than this is never offered for expansion
pub const MIN_FREE_SPACE_BYTES: u64 = 10 * MIB;

/// Convert bytes to human-readable format (e.g., "1.50 GB")
pub fn bytes_to_pretty(bytes: &u64, add_bytes: bool) -> String {
    let mut steps = 0;
    let mut val: f64 = *bytes as f64;

    while val > 1024. && steps <= 8 {
        val /= 1024.;
        steps += 1;
    }

    let unit = match steps {
        0 => "B",
        1 => "KB",
        2 => "MB",
        3 => "GB",
        4 => "TB",
        5 => "PB",
        6 => "EB",
        7 => "ZB",
        8 => "YB",
        _ => "Not Supported",
    };

    if add_bytes {
        let bytes_str = bytes.to_formatted_string(&Locale::en);
        format!("{:.2} {} ({} bytes)", val, unit, bytes_str)
    } else {
        format!("{:.2} {}", val, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_ten_mebibytes() {
        assert_eq!(MIN_FREE_SPACE_BYTES, 10_485_760);
    }

    #[test]
    fn formats_bytes_with_grouping() {
        assert_eq!(bytes_to_pretty(&512, false), "512.00 B");
        assert_eq!(
            bytes_to_pretty(&94_371_840, true),
            "90.00 MB (94,371,840 bytes)"
        );
    }
}
