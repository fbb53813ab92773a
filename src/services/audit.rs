use crate::error::{OpsError, OpsResult};
use crate::models::{AuditAction, AuditEntry};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{Local, Timelike};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};

/// File name of the audit log inside the out directory
pub const AUDIT_LOG_FILE: &str = "audit.log";

/// Append-only audit trail of lock transitions.
///
/// There is no in-memory buffer: every append opens the file, writes one whole
/// line with a single `write_all`, and closes it again, so entries from other
/// sessions sharing the out directory interleave at line granularity.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: Utf8PathBuf,
}

impl AuditLog {
    /// Audit log living at `<out_dir>/audit.log`
    pub fn new(out_dir: &Utf8Path) -> Self {
        Self {
            path: out_dir.join(AUDIT_LOG_FILE),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Record `action` on `filename`, stamped with the local wall-clock time.
    pub fn append(&self, action: AuditAction, filename: &str) -> OpsResult<AuditEntry> {
        let now = Local::now().naive_local();
        let timestamp = now.with_nanosecond(0).unwrap_or(now);
        let entry = AuditEntry::new(timestamp, action, filename);

        self.write_entry(&entry)?;
        tracing::debug!("Audit: {}", entry);
        Ok(entry)
    }

    /// Append an already-built entry.
    pub fn write_entry(&self, entry: &AuditEntry) -> OpsResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| OpsError::from_io(format!("Failed to open audit log {}", self.path), e))?;

        let line = format!("{}\n", entry.to_line());
        file.write_all(line.as_bytes())
            .map_err(|e| OpsError::from_io(format!("Failed to write audit log {}", self.path), e))
    }

    /// Read the log back in file order. A missing log has no entries.
    ///
    /// Lines that are not in the audit format are skipped.
    pub fn entries(&self) -> OpsResult<Vec<AuditEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(OpsError::from_io(
                    format!("Failed to read audit log {}", self.path),
                    e,
                ));
            }
        };

        Ok(content.lines().filter_map(AuditEntry::parse_line).collect())
    }
}
