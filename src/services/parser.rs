use crate::models::ProcessRecord;
use regex::Regex;

/// Turns raw process-listing output into [`ProcessRecord`]s.
///
/// Malformed lines are dropped silently: a partial listing is more useful to
/// the operator than none.
///
/// # Formats
///
/// - Windows: `tasklist /FO CSV`, quoted fields, header row first. Columns are
///   `"Image Name","PID",...`; a record whose second field is not a PID but
///   whose first field is gets read PID-first instead.
/// - POSIX: `ps -o pid=,comm=`, no header, PID then name. The name is the rest
///   of the line because macOS reports full executable paths, spaces included.
pub struct ProcessRecordParser {
    /// Matches `  <pid> <name...>` lines from `ps`
    columns_pattern: Regex,
}

impl ProcessRecordParser {
    pub fn new() -> Self {
        Self {
            columns_pattern: Regex::new(r"^\s*(\d+)\s+(\S.*?)\s*$").expect("Invalid ps line regex"),
        }
    }

    /// Parse `tasklist` CSV. The first row is always treated as the header.
    pub fn parse_csv(&self, raw: &str) -> Vec<ProcessRecord> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(raw.as_bytes());

        let mut dropped = 0usize;
        let records: Vec<ProcessRecord> = reader
            .records()
            .filter_map(|row| {
                let record = row.ok().and_then(|row| match (row.get(0), row.get(1)) {
                    (Some(first), Some(second)) => record_from_fields(first, second),
                    _ => None,
                });
                if record.is_none() {
                    dropped += 1;
                }
                record
            })
            .collect();

        if dropped > 0 {
            tracing::debug!("Dropped {} malformed CSV process rows", dropped);
        }

        records
    }

    /// Parse two-column `ps` output. There is no header to skip.
    pub fn parse_columns(&self, raw: &str) -> Vec<ProcessRecord> {
        let mut dropped = 0usize;
        let records: Vec<ProcessRecord> = raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let record = self.columns_pattern.captures(line).and_then(|caps| {
                    let pid = caps[1].parse::<u32>().ok()?;
                    Some(ProcessRecord::new(pid, &caps[2]))
                });
                if record.is_none() {
                    dropped += 1;
                }
                record
            })
            .collect();

        if dropped > 0 {
            tracing::debug!("Dropped {} malformed ps lines", dropped);
        }

        records
    }
}

impl Default for ProcessRecordParser {
    fn default() -> Self {
        Self::new()
    }
}

fn record_from_fields(first: &str, second: &str) -> Option<ProcessRecord> {
    if let Ok(pid) = second.parse::<u32>() {
        if !first.is_empty() {
            return Some(ProcessRecord::new(pid, first));
        }
    }

    match first.parse::<u32>() {
        Ok(pid) if !second.is_empty() => Some(ProcessRecord::new(pid, second)),
        _ => None,
    }
}
