use crate::models::ProcessRecord;
use crate::platform::PlatformFamily;
use crate::services::command::{CommandSpec, ProcessOperation};
use crate::services::parser::ProcessRecordParser;

/// Platform capability for process operations.
///
/// Knows which external tool implements each [`ProcessOperation`] and how to
/// read that tool's output. Nothing outside the two implementations branches
/// on the platform.
pub trait ProcessBackend: Send + Sync {
    fn family(&self) -> PlatformFamily;

    /// Build the command line for an operation.
    fn command(&self, operation: ProcessOperation) -> CommandSpec;

    /// Parse the standard output of any command built by [`command`](Self::command).
    fn parse(&self, raw: &str) -> Vec<ProcessRecord>;
}

/// `tasklist` / `taskkill`
///
/// Termination is forced (`/F`) and takes the child process tree with it (`/T`).
pub struct WindowsProcessBackend {
    parser: ProcessRecordParser,
}

impl WindowsProcessBackend {
    pub fn new() -> Self {
        Self {
            parser: ProcessRecordParser::new(),
        }
    }
}

impl Default for WindowsProcessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessBackend for WindowsProcessBackend {
    fn family(&self) -> PlatformFamily {
        PlatformFamily::Windows
    }

    fn command(&self, operation: ProcessOperation) -> CommandSpec {
        match operation {
            ProcessOperation::List | ProcessOperation::FilterCandidates => {
                CommandSpec::new("tasklist", ["/FO", "CSV"])
            }
            ProcessOperation::TerminateCheck { pid } => CommandSpec::new(
                "tasklist",
                [
                    "/FI".to_string(),
                    format!("PID eq {}", pid),
                    "/FO".to_string(),
                    "CSV".to_string(),
                ],
            ),
            ProcessOperation::TerminateKill { pid } => CommandSpec::new(
                "taskkill",
                [
                    "/PID".to_string(),
                    pid.to_string(),
                    "/F".to_string(),
                    "/T".to_string(),
                ],
            ),
        }
    }

    fn parse(&self, raw: &str) -> Vec<ProcessRecord> {
        self.parser.parse_csv(raw)
    }
}

/// `ps` / `kill`
///
/// Termination sends SIGKILL straight away; no SIGTERM grace period is tried.
pub struct PosixProcessBackend {
    parser: ProcessRecordParser,
}

impl PosixProcessBackend {
    pub fn new() -> Self {
        Self {
            parser: ProcessRecordParser::new(),
        }
    }
}

impl Default for PosixProcessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessBackend for PosixProcessBackend {
    fn family(&self) -> PlatformFamily {
        PlatformFamily::Posix
    }

    fn command(&self, operation: ProcessOperation) -> CommandSpec {
        match operation {
            // Empty column titles (`pid=`) suppress the header line
            ProcessOperation::List | ProcessOperation::FilterCandidates => {
                CommandSpec::new("ps", ["-Ao", "pid=,comm="])
            }
            ProcessOperation::TerminateCheck { pid } => CommandSpec::new(
                "ps",
                [
                    "-p".to_string(),
                    pid.to_string(),
                    "-o".to_string(),
                    "pid=,comm=".to_string(),
                ],
            ),
            ProcessOperation::TerminateKill { pid } => {
                CommandSpec::new("kill", ["-9".to_string(), pid.to_string()])
            }
        }
    }

    fn parse(&self, raw: &str) -> Vec<ProcessRecord> {
        self.parser.parse_columns(raw)
    }
}

/// Build the process backend for a platform family.
pub fn backend_for(family: PlatformFamily) -> Box<dyn ProcessBackend> {
    match family {
        PlatformFamily::Windows => Box::new(WindowsProcessBackend::new()),
        PlatformFamily::Posix => Box::new(PosixProcessBackend::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_commands() {
        let backend = WindowsProcessBackend::new();

        assert_eq!(
            backend.command(ProcessOperation::List),
            CommandSpec::new("tasklist", ["/FO", "CSV"])
        );
        assert_eq!(
            backend.command(ProcessOperation::FilterCandidates),
            backend.command(ProcessOperation::List)
        );
        assert_eq!(
            backend.command(ProcessOperation::TerminateCheck { pid: 4242 }),
            CommandSpec::new("tasklist", ["/FI", "PID eq 4242", "/FO", "CSV"])
        );
        assert_eq!(
            backend.command(ProcessOperation::TerminateKill { pid: 4242 }),
            CommandSpec::new("taskkill", ["/PID", "4242", "/F", "/T"])
        );
    }

    #[test]
    fn test_posix_commands() {
        let backend = PosixProcessBackend::new();

        assert_eq!(
            backend.command(ProcessOperation::List),
            CommandSpec::new("ps", ["-Ao", "pid=,comm="])
        );
        assert_eq!(
            backend.command(ProcessOperation::TerminateCheck { pid: 77 }),
            CommandSpec::new("ps", ["-p", "77", "-o", "pid=,comm="])
        );
        assert_eq!(
            backend.command(ProcessOperation::TerminateKill { pid: 77 }),
            CommandSpec::new("kill", ["-9", "77"])
        );
    }

    #[test]
    fn test_each_backend_parses_its_own_format() {
        let csv = "\"Image Name\",\"PID\"\n\"init\",\"5\"\n";
        let columns = "    5 init\n";

        assert_eq!(
            backend_for(PlatformFamily::Windows).parse(csv),
            vec![ProcessRecord::new(5, "init")]
        );
        assert_eq!(
            backend_for(PlatformFamily::Posix).parse(columns),
            vec![ProcessRecord::new(5, "init")]
        );
        assert!(backend_for(PlatformFamily::Posix).parse(csv).is_empty());
    }

    #[test]
    fn test_backend_for_family() {
        assert_eq!(backend_for(PlatformFamily::Windows).family(), PlatformFamily::Windows);
        assert_eq!(backend_for(PlatformFamily::Posix).family(), PlatformFamily::Posix);
    }
}
