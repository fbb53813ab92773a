// OpsConsole - process control and secure file operations from one terminal menu
//
// This is the library crate containing the services, models and console.
// The binary crate (main.rs) wires them to stdin/stdout.

pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod platform;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use console::Console;
pub use error::{OpsError, OpsResult};
pub use metrics::Metrics;
pub use models::{AuditAction, AuditEntry, ConsoleConfig, ProcessRecord, ProtectionState};
pub use platform::PlatformFamily;
pub use state::{TerminationRequest, TerminationState};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
