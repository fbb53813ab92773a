use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// Timestamp layout used inside the brackets of every audit line
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// OS-level write protection of a file.
///
/// Never stored: computed on demand from the attribute bits (Windows) or the
/// three write bits of the mode (POSIX).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionState {
    ReadOnly,
    Writable,
}

impl ProtectionState {
    pub fn from_read_only(read_only: bool) -> Self {
        if read_only {
            Self::ReadOnly
        } else {
            Self::Writable
        }
    }

    pub fn is_read_only(self) -> bool {
        self == Self::ReadOnly
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ReadOnly => "read-only",
            Self::Writable => "writable",
        }
    }
}

impl fmt::Display for ProtectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lock transitions recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Lock,
    Unlock,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lock => "LOCK",
            Self::Unlock => "UNLOCK",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCK" => Ok(Self::Lock),
            "UNLOCK" => Ok(Self::Unlock),
            other => Err(format!("unknown audit action: {}", other)),
        }
    }
}

/// One line of `audit.log`: `[YYYY-MM-DD HH:MM:SS] <ACTION> <filename>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Local wall-clock time of the transition
    pub timestamp: NaiveDateTime,
    pub action: AuditAction,
    pub filename: String,
}

impl AuditEntry {
    pub fn new(timestamp: NaiveDateTime, action: AuditAction, filename: impl Into<String>) -> Self {
        Self {
            timestamp,
            action,
            filename: filename.into(),
        }
    }

    /// Render the entry as a log line, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "[{}] {} {}",
            self.timestamp.format(AUDIT_TIMESTAMP_FORMAT),
            self.action,
            self.filename
        )
    }

    /// Parse a log line. Returns `None` for anything not in the audit format.
    ///
    /// File names may contain spaces; everything after the action is the name.
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.trim_end().strip_prefix('[')?;
        let (stamp, rest) = rest.split_once("] ")?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, AUDIT_TIMESTAMP_FORMAT).ok()?;
        let (action, filename) = rest.split_once(' ')?;
        let action = action.parse().ok()?;
        if filename.is_empty() {
            return None;
        }

        Some(Self::new(timestamp, action, filename))
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}
