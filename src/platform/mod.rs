//! Platform family detection.
//!
//! The console distinguishes exactly two OS families. Everything else is an
//! [`OpsError::Unsupported`] failure, reported to the operator rather than
//! panicking. Detection happens once at startup; components receive the
//! capability objects built from the family, never the OS name itself.

use crate::error::{OpsError, OpsResult};
use std::fmt;

/// POSIX-like OS names whose `ps` understands `-Ao pid=,comm=`
const POSIX_OS_NAMES: &[&str] = &["linux", "macos", "freebsd", "openbsd", "netbsd", "dragonfly"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFamily {
    Windows,
    Posix,
}

impl PlatformFamily {
    /// Classify an OS name as reported by `std::env::consts::OS`.
    pub fn from_os_name(os: &str) -> OpsResult<Self> {
        if os == "windows" {
            Ok(Self::Windows)
        } else if POSIX_OS_NAMES.contains(&os) {
            Ok(Self::Posix)
        } else {
            Err(OpsError::Unsupported(os.to_string()))
        }
    }

    /// Family of the running target.
    pub fn detect() -> OpsResult<Self> {
        let family = Self::from_os_name(std::env::consts::OS)?;
        tracing::debug!("Detected platform family {} ({})", family, std::env::consts::OS);
        Ok(family)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Posix => "POSIX",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
