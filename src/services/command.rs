use crate::error::{OpsError, OpsResult};
use crate::models::ProcessRecord;
use crate::platform::PlatformFamily;
use crate::services::backend::ProcessBackend;
use std::fmt;
use std::future::Future;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

/// Process operations that require an external OS tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOperation {
    /// Snapshot of running processes for enumeration
    List,
    /// Snapshot of running processes for keyword filtering (same command as `List`)
    FilterCandidates,
    /// Existence check of a single PID right before termination
    TerminateCheck { pid: u32 },
    /// Forced termination of a single PID
    TerminateKill { pid: u32 },
}

impl ProcessOperation {
    pub fn label(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::FilterCandidates => "filter",
            Self::TerminateCheck { .. } => "check",
            Self::TerminateKill { .. } => "kill",
        }
    }

    /// Whether a non-zero exit status is an execution failure.
    ///
    /// The check step is judged by its parsed records only: `ps -p` exits 1
    /// for a missing PID and `tasklist` prints an `INFO:` line instead.
    fn requires_success(self) -> bool {
        !matches!(self, Self::TerminateCheck { .. })
    }
}

/// A fully resolved external command: program plus argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the child was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Most useful diagnostic text: stderr, or stdout when stderr is empty.
    pub fn detail(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// The effect boundary: run one external tool and capture its output.
///
/// Production code uses [`SystemCommandRunner`]; tests substitute runners that
/// return canned output.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> impl Future<Output = OpsResult<CommandOutput>> + Send;
}

/// Runs commands as real child processes via `tokio::process`.
///
/// One child per call. The caller's future completes only when the child has
/// exited; there is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> OpsResult<CommandOutput> {
        tracing::debug!("Executing: {}", spec);
        let start = Instant::now();

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| OpsError::SpawnFailure {
                program: spec.program.clone(),
                source,
            })?;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            "{} completed in {:.2}s with status {:?}",
            spec.program,
            start.elapsed().as_secs_f32(),
            result.status
        );

        Ok(result)
    }
}

/// Stands in for [`SystemCommandRunner`] on an OS with no known process tools.
///
/// Every command fails with [`OpsError::Unsupported`] naming the OS, so process
/// actions report the problem while the rest of the console keeps working.
#[derive(Debug, Clone)]
pub struct UnsupportedRunner {
    os: String,
}

impl UnsupportedRunner {
    pub fn new(os: impl Into<String>) -> Self {
        Self { os: os.into() }
    }
}

impl CommandRunner for UnsupportedRunner {
    async fn run(&self, spec: &CommandSpec) -> OpsResult<CommandOutput> {
        tracing::warn!("Refusing to run {} on {}", spec, self.os);
        Err(OpsError::Unsupported(self.os.clone()))
    }
}

/// OS Command Adapter: picks the platform command for an operation, runs it
/// and hands the raw output to the platform parser.
///
/// All platform branching lives behind the [`ProcessBackend`] it holds.
pub struct OsCommandAdapter<R> {
    backend: Box<dyn ProcessBackend>,
    runner: R,
}

impl<R: CommandRunner> OsCommandAdapter<R> {
    pub fn new(backend: Box<dyn ProcessBackend>, runner: R) -> Self {
        Self { backend, runner }
    }

    pub fn family(&self) -> PlatformFamily {
        self.backend.family()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run the platform command for `operation` and return its raw output.
    ///
    /// # Errors
    /// - [`OpsError::SpawnFailure`] when the tool could not be started
    /// - [`OpsError::ExecutionFailure`] on a non-zero exit (except for the check step)
    pub async fn execute(&self, operation: ProcessOperation) -> OpsResult<CommandOutput> {
        let spec = self.backend.command(operation);
        let output = self.runner.run(&spec).await?;

        if operation.requires_success() && !output.success() {
            tracing::warn!(
                "{} command failed with status {:?}: {}",
                operation.label(),
                output.status,
                output.detail()
            );
            return Err(OpsError::ExecutionFailure {
                program: spec.program,
                code: output.status,
                detail: output.detail().to_string(),
            });
        }

        Ok(output)
    }

    /// Run a snapshot-style operation and parse the records it produced.
    pub async fn query(&self, operation: ProcessOperation) -> OpsResult<Vec<ProcessRecord>> {
        let output = self.execute(operation).await?;
        let records = self.backend.parse(&output.stdout);

        tracing::debug!(
            "{} query returned {} records",
            operation.label(),
            records.len()
        );

        Ok(records)
    }
}
