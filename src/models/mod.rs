//! Data models for the operator console.
//!
//! - [`ProcessRecord`]: One running process as reported by a platform snapshot. Ephemeral,
//!   rebuilt for every query and never cached.
//! - [`ProtectionState`]: Read-only or writable, derived on demand from OS attribute/mode bits.
//! - [`AuditEntry`] / [`AuditAction`]: One line of the append-only audit log.
//! - [`ConsoleConfig`]: Startup configuration loaded from `opsconsole.yaml`.

pub mod access;
pub mod config;
pub mod process;

pub use access::{AuditAction, AuditEntry, ProtectionState, AUDIT_TIMESTAMP_FORMAT};
pub use config::ConsoleConfig;
pub use process::ProcessRecord;
