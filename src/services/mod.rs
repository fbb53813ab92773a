//! Services module - the operations behind the console menus.
//!
//! Everything here is free of terminal I/O: the console prompts, the services
//! act and return typed results or [`OpsError`](crate::error::OpsError)s.
//!
//! # Components
//!
//! - [`OsCommandAdapter`]: the effect boundary for process operations. It asks
//!   its [`ProcessBackend`] for the platform command, runs it through a
//!   [`CommandRunner`] and parses the output with the [`ProcessRecordParser`].
//! - [`ProcessDirectory`]: bounded enumeration and case-insensitive filtering.
//! - [`ProcessTerminator`]: drives a [`TerminationRequest`](crate::state::TerminationRequest)
//!   through check, confirmation and kill.
//! - [`LockRegistry`] and [`AuditLog`]: advisory marker-file locks, each
//!   transition recorded as one audit line.
//! - [`ProtectionToggle`] and [`PermissionAuditor`]: OS-level read-only
//!   protection through a [`ProtectionBackend`].
//!
//! Locks and protection are independent: locking never changes permissions and
//! changing permissions never touches a marker.
//!
//! # Usage Example
//!
//! ```ignore
//! use opsconsole::platform::PlatformFamily;
//! use opsconsole::services::{backend_for, OsCommandAdapter, ProcessDirectory, SystemCommandRunner};
//! use std::sync::Arc;
//!
//! let family = PlatformFamily::detect()?;
//! let adapter = Arc::new(OsCommandAdapter::new(backend_for(family), SystemCommandRunner));
//! let directory = ProcessDirectory::new(adapter);
//!
//! for record in directory.enumerate(10).await? {
//!     println!("{}", record);
//! }
//! ```

pub mod audit;
pub mod backend;
pub mod command;
pub mod locks;
pub mod parser;
pub mod processes;
pub mod protection;

pub use audit::{AUDIT_LOG_FILE, AuditLog};
pub use backend::{PosixProcessBackend, ProcessBackend, WindowsProcessBackend, backend_for};
pub use command::{
    CommandOutput, CommandRunner, CommandSpec, OsCommandAdapter, ProcessOperation,
    SystemCommandRunner, UnsupportedRunner,
};
pub use locks::{LOCK_SUFFIX, LockRegistry};
pub use parser::ProcessRecordParser;
pub use processes::{
    Confirmer, DEFAULT_LIST_LIMIT, ProcessDirectory, ProcessTerminator, parse_limit, parse_pid,
};
pub use protection::{
    PermissionAuditor, ProtectionBackend, ProtectionToggle, UnsupportedProtection,
    protection_backend,
};
