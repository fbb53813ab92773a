use std::io;
use thiserror::Error;

/// Errors surfaced by the process and file-access-control operations.
///
/// None of these are fatal to the console session: the menu loop reports the
/// message and regains control.
#[derive(Error, Debug)]
pub enum OpsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Unsupported operating system: {0}")]
    Unsupported(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to start {program}: {source}")]
    SpawnFailure {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {}: {detail}", exit_label(.code))]
    ExecutionFailure {
        program: String,
        code: Option<i32>,
        detail: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for process and access-control operations
pub type OpsResult<T> = std::result::Result<T, OpsError>;

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl OpsError {
    /// Classify an OS error against a file path.
    ///
    /// Missing files and privilege failures get their own variants; anything
    /// else keeps the OS detail under [`OpsError::Io`].
    pub fn from_io(context: impl Into<String>, source: io::Error) -> Self {
        let context = context.into();
        match source.kind() {
            io::ErrorKind::NotFound => OpsError::NotFound(format!("{} ({})", context, source)),
            io::ErrorKind::PermissionDenied => {
                OpsError::PermissionDenied(format!("{} ({})", context, source))
            }
            _ => OpsError::Io { context, source },
        }
    }
}
