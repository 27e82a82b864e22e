// SPDX-License-Identifier: GPL-3.0-only

//! Partition layout inspection through `parted --machine`
//!
//! `parted -s -m <disk> unit B print free` prints:
//!
//! ```text
//! BYT;
//! /dev/sda:107374182400B:scsi:512:512:msdos:ATA VBOX HARDDISK:;
//! 1:32256B:1048575B:1016320B:free;
//! 1:1048576B:10485759B:9437184B:ext4::boot;
//! 1:10485760B:104857599B:94371840B:free;
//! ```
//!
//! The first line names the unit, the second describes the disk (field 6 is
//! the label type), every further line is `number:start:end:size:type:...;`
//! where a type of `free` marks unallocated space. Parted numbers free
//! regions too, so that number is ignored.

use storage_types::{PartitionRecord, PartitionTableType};

use crate::command::{CommandRunner, render};
use crate::{ExpandError, Result};

const BYTE_UNIT_LINE: &str = "BYT";
const BYTE_SUFFIX: &str = "B";
const FREE_TYPE: &str = "free";
const TABLE_TYPE_FIELD: usize = 5;

fn malformed(reason: impl Into<String>) -> ExpandError {
    ExpandError::ToolInvocation {
        command: "parted".to_string(),
        reason: reason.into(),
    }
}

fn fields(line: &str) -> Vec<&str> {
    line.trim_end_matches(';').split(':').collect()
}

/// Parse `<digits>B`; any other unit suffix is refused
fn parse_bytes(field: &str) -> Result<u64> {
    let split = field
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(field.len());
    let (digits, suffix) = field.split_at(split);

    if digits.is_empty() {
        return Err(malformed(format!("invalid offset '{field}'")));
    }
    if suffix != BYTE_SUFFIX {
        return Err(ExpandError::UnsupportedUnit(field.to_string()));
    }

    digits
        .parse()
        .map_err(|_| malformed(format!("offset out of range '{field}'")))
}

fn parse_unit_line(line: &str) -> Result<()> {
    match line.trim_end_matches(';') {
        BYTE_UNIT_LINE => Ok(()),
        "CHS" | "CYL" => Err(ExpandError::UnsupportedUnit(line.to_string())),
        _ => Err(malformed(format!("unexpected first line '{line}'"))),
    }
}

fn parse_table_type(line: &str) -> Result<PartitionTableType> {
    fields(line)
        .get(TABLE_TYPE_FIELD)
        .map(|label| PartitionTableType::parse(label))
        .ok_or_else(|| malformed(format!("unexpected device line '{line}'")))
}

fn parse_record(line: &str, table_type: &PartitionTableType) -> Result<PartitionRecord> {
    let cols = fields(line);
    if cols.len() < 4 {
        return Err(malformed(format!("unexpected record line '{line}'")));
    }

    let start = parse_bytes(cols[1])?;
    let end = parse_bytes(cols[2])?;
    let size = parse_bytes(cols[3])?;
    if start > end {
        return Err(malformed(format!("record ends before it starts '{line}'")));
    }

    let kind = cols.get(4).copied().unwrap_or_default();
    if kind == FREE_TYPE {
        return Ok(PartitionRecord::free_space(
            start,
            end,
            size,
            table_type.clone(),
        ));
    }

    let number = cols[0]
        .parse()
        .map_err(|_| malformed(format!("invalid partition number '{}'", cols[0])))?;

    Ok(PartitionRecord {
        number: Some(number),
        start,
        end,
        size,
        filesystem_type: (!kind.is_empty()).then(|| kind.to_string()),
        table_type: table_type.clone(),
    })
}

/// Translate machine-readable parted output into layout records.
///
/// Every record carries the table type read from the device line.
pub fn parse_listing(output: &str) -> Result<Vec<PartitionRecord>> {
    let mut lines = output.lines().map(str::trim).filter(|line| !line.is_empty());

    let unit = lines.next().ok_or_else(|| malformed("empty output"))?;
    parse_unit_line(unit)?;

    let device = lines
        .next()
        .ok_or_else(|| malformed("missing device line"))?;
    let table_type = parse_table_type(device)?;

    lines.map(|line| parse_record(line, &table_type)).collect()
}

/// Arguments for a byte-unit, free-space-aware listing of `parent`
pub fn list_args(parent: &str) -> Vec<String> {
    ["-s", "-m", parent, "unit", "B", "print", "free"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Run parted against `parent` and parse its layout
pub fn inspect<R: CommandRunner>(
    runner: &R,
    parted: &str,
    parent: &str,
) -> Result<Vec<PartitionRecord>> {
    let args = list_args(parent);
    let command = render(parted, &args);

    let output = runner
        .run(parted, &args)
        .map_err(|error| ExpandError::ToolInvocation {
            command: command.clone(),
            reason: error.to_string(),
        })?;

    if !output.success {
        return Err(ExpandError::ToolInvocation {
            command,
            reason: output.failure_reason(),
        });
    }

    let records = parse_listing(&output.stdout)?;
    tracing::debug!("Parsed {} layout records from {}", records.len(), parent);
    Ok(records)
}
