use std::fmt;

/// A single process from a platform snapshot.
///
/// PIDs are unique at a point in time only; the OS reuses them after exit, so a
/// record must never outlive the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
}

impl ProcessRecord {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }

    /// Case-insensitive substring match on the display name.
    ///
    /// `keyword` is expected to be lowercase already.
    pub(crate) fn name_contains_lowercase(&self, keyword: &str) -> bool {
        self.name.to_lowercase().contains(keyword)
    }
}

impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.pid, self.name)
    }
}
