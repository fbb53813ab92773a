//! Interactive console: numbered menus over the process and secure-file services.
//!
//! The console is synchronous. Process operations are async services, so the
//! console owns a current-thread tokio runtime and blocks on each one; the
//! operator waits for every external command to finish.
//!
//! It is generic over its input, output and [`CommandRunner`], so tests drive
//! it with scripted input and canned command output.

pub mod menu;
pub mod prompt;

use crate::error::{OpsError, OpsResult};
use crate::metrics::Metrics;
use crate::models::{ConsoleConfig, ProcessRecord};
use crate::services::{
    CommandRunner, DEFAULT_LIST_LIMIT, LockRegistry, OsCommandAdapter, PermissionAuditor,
    ProcessDirectory, ProcessTerminator, ProtectionBackend, ProtectionToggle, parse_limit,
    parse_pid,
};
use crate::state::{AbortReason, ExecutionOutcome, TerminationState, TransitionError};
use camino::{Utf8Path, Utf8PathBuf};
use menu::{MainChoice, MenuEntry, ProcessChoice, SecureChoice};
use prompt::Prompter;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

/// What the menu loop does after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Stay,
    Back,
    /// End of input: leave every menu
    Exit,
}

/// Failure of a single menu action.
///
/// Domain errors are shown to the operator and the menu continues; terminal
/// I/O errors end the session.
#[derive(Debug, Error)]
enum ActionError {
    #[error(transparent)]
    Ops(#[from] OpsError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Terminal(#[from] io::Error),
}

/// A file chosen by the operator, resolved against the out directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub path: Utf8PathBuf,
    /// File name used as the lock name
    pub name: String,
}

/// Resolve an operator-supplied path.
///
/// An absolute path is used as-is; a relative path is used when it exists from
/// the working directory, otherwise it is looked up inside `out_dir`. The
/// resolved file must exist.
pub fn resolve_target(input: &str, out_dir: &Utf8Path) -> OpsResult<ResolvedTarget> {
    let input = input.trim();
    if input.is_empty() {
        return Err(OpsError::InvalidInput("file path is empty".to_string()));
    }

    let given = Utf8Path::new(input);
    let path = if given.is_absolute() || given.exists() {
        given.to_path_buf()
    } else {
        out_dir.join(given)
    };

    if !path.exists() {
        return Err(OpsError::NotFound(format!("no such file {}", path)));
    }

    let name = path
        .file_name()
        .ok_or_else(|| OpsError::InvalidInput(format!("{} has no file name", path)))?
        .to_string();

    Ok(ResolvedTarget { path, name })
}

/// The operator console
pub struct Console<R, I, O> {
    runtime: Runtime,
    config: ConsoleConfig,
    /// Platform shown in the banner
    platform: String,
    directory: ProcessDirectory<R>,
    terminator: ProcessTerminator<R>,
    locks: LockRegistry,
    toggle: ProtectionToggle,
    auditor: PermissionAuditor,
    metrics: Arc<Metrics>,
    prompter: Prompter<I, O>,
}

impl<R, I, O> Console<R, I, O>
where
    R: CommandRunner,
    I: BufRead,
    O: Write,
{
    /// Wire the console to its services.
    ///
    /// # Arguments
    /// * `config` - Paths; `out_dir` holds lock markers and the audit log
    /// * `adapter` - Process command adapter for the detected platform
    /// * `protection` - Read-only protection backend for the same platform
    /// * `metrics` - Session counters
    /// * `input` / `output` - Operator terminal
    pub fn new(
        config: ConsoleConfig,
        adapter: OsCommandAdapter<R>,
        protection: Arc<dyn ProtectionBackend>,
        metrics: Arc<Metrics>,
        input: I,
        output: O,
    ) -> OpsResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OpsError::from_io("Failed to start the command runtime", e))?;

        let platform = adapter.family().to_string();
        let adapter = Arc::new(adapter);

        Ok(Self {
            runtime,
            platform,
            directory: ProcessDirectory::new(Arc::clone(&adapter)),
            terminator: ProcessTerminator::new(adapter),
            locks: LockRegistry::new(&config.out_dir),
            toggle: ProtectionToggle::new(Arc::clone(&protection)),
            auditor: PermissionAuditor::new(protection),
            config,
            metrics,
            prompter: Prompter::new(input, output),
        })
    }

    /// Replace the platform name shown in the banner, e.g. for an OS with no
    /// process or protection support.
    pub fn with_platform_label(mut self, label: impl Into<String>) -> Self {
        self.platform = label.into();
        self
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Give back the output sink, e.g. to inspect a scripted session.
    pub fn into_output(self) -> O {
        self.prompter.into_output()
    }

    /// Run the main menu until the operator quits or input ends.
    ///
    /// # Errors
    /// Only terminal I/O errors; operation failures are shown and the menu continues.
    pub fn run(&mut self) -> io::Result<()> {
        tracing::info!("Console session started ({})", self.platform);
        self.prompter.say(format!(
            "{} {} ({})",
            crate::APP_NAME,
            crate::VERSION,
            self.platform
        ))?;

        loop {
            self.prompter.say(MainChoice::render())?;
            let Some(answer) = self.prompter.ask("Choice: ")? else {
                break;
            };

            let flow = match MainChoice::parse(&answer) {
                Some(MainChoice::Processes) => self.process_menu()?,
                Some(MainChoice::SecureFiles) => self.secure_menu()?,
                Some(MainChoice::Quit) => break,
                None => {
                    self.prompter.say("Invalid option")?;
                    Flow::Stay
                }
            };
            if flow == Flow::Exit {
                break;
            }
        }

        self.prompter.say("Goodbye.")?;
        tracing::info!("Console session ended");
        Ok(())
    }

    fn process_menu(&mut self) -> io::Result<Flow> {
        loop {
            self.prompter.say(ProcessChoice::render())?;
            let Some(answer) = self.prompter.ask("Choice: ")? else {
                return Ok(Flow::Exit);
            };
            let Some(choice) = ProcessChoice::parse(&answer) else {
                self.prompter.say("Invalid option")?;
                continue;
            };

            let result = match choice {
                ProcessChoice::List => self.list_processes(),
                ProcessChoice::Filter => self.filter_processes(),
                ProcessChoice::Kill => self.kill_process(),
                ProcessChoice::Back => return Ok(Flow::Back),
            };
            match self.settle(result)? {
                Flow::Stay => {}
                flow => return Ok(flow),
            }
        }
    }

    fn secure_menu(&mut self) -> io::Result<Flow> {
        loop {
            self.prompter.say(SecureChoice::render())?;
            let Some(answer) = self.prompter.ask("Choice: ")? else {
                return Ok(Flow::Exit);
            };
            let Some(choice) = SecureChoice::parse(&answer) else {
                self.prompter.say("Invalid option")?;
                continue;
            };
            if choice == SecureChoice::Back {
                return Ok(Flow::Back);
            }

            let result = self.secure_action(choice);
            match self.settle(result)? {
                Flow::Stay => {}
                flow => return Ok(flow),
            }
        }
    }

    /// Show a failed action as `Error: ...` and stay in the menu.
    fn settle(&mut self, result: Result<Flow, ActionError>) -> io::Result<Flow> {
        match result {
            Ok(flow) => Ok(flow),
            Err(ActionError::Terminal(e)) => Err(e),
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, message: impl std::fmt::Display) -> io::Result<Flow> {
        self.metrics.record_failure();
        self.prompter.error(message)?;
        Ok(Flow::Stay)
    }

    fn show_records(&mut self, records: &[ProcessRecord], empty: &str) -> io::Result<()> {
        if records.is_empty() {
            return self.prompter.say(empty);
        }
        self.prompter.say("PID\tNAME")?;
        for record in records {
            self.prompter.say(record)?;
        }
        Ok(())
    }

    fn list_processes(&mut self) -> Result<Flow, ActionError> {
        let question = format!("How many processes to show [{}]: ", DEFAULT_LIST_LIMIT);
        let Some(answer) = self.prompter.ask(&question)? else {
            return Ok(Flow::Exit);
        };

        let limit = parse_limit(&answer);
        let records = self.runtime.block_on(self.directory.enumerate(limit))?;
        self.metrics.record_processes_listed(records.len());
        self.show_records(&records, "No processes found.")?;
        Ok(Flow::Stay)
    }

    fn filter_processes(&mut self) -> Result<Flow, ActionError> {
        let Some(keyword) = self.prompter.ask("Process name contains: ")? else {
            return Ok(Flow::Exit);
        };

        let records = self.runtime.block_on(self.directory.filter(&keyword))?;
        self.metrics.record_filter();
        self.show_records(&records, "No matching processes.")?;
        Ok(Flow::Stay)
    }

    fn kill_process(&mut self) -> Result<Flow, ActionError> {
        let Some(answer) = self.prompter.ask("PID to terminate: ")? else {
            return Ok(Flow::Exit);
        };
        let pid = parse_pid(&answer)?;

        self.metrics.record_kill_attempt();
        let mut request = self.runtime.block_on(self.terminator.verify(pid));

        let target = match request.state() {
            TerminationState::Verified { target } => target.clone(),
            TerminationState::Aborted {
                reason: AbortReason::CheckFailed(detail),
                ..
            } => {
                let detail = detail.clone();
                return Ok(self.fail(detail)?);
            }
            _ => {
                return Err(OpsError::NotFound(format!("no process with PID {}", pid)).into());
            }
        };

        self.prompter.say(format!("Found process {}", target))?;
        let question = format!("Terminate {} (PID {})? Type 'yes' to confirm: ", target.name, pid);
        let answer = self.prompter.ask(&question)?;
        request.confirm(answer.as_deref().unwrap_or_default())?;

        if request.kill_target().is_none() {
            self.prompter.say("Termination cancelled.")?;
            return Ok(if answer.is_none() { Flow::Exit } else { Flow::Stay });
        }

        self.runtime.block_on(self.terminator.execute(&mut request))?;

        match request.state() {
            TerminationState::Executed {
                outcome: ExecutionOutcome::Success,
                ..
            } => {
                self.metrics.record_kill_success();
                self.prompter
                    .say(format!("Process {} ({}) terminated.", pid, target.name))?;
                Ok(Flow::Stay)
            }
            TerminationState::Executed {
                outcome: ExecutionOutcome::Failure(detail),
                ..
            } => {
                let detail = detail.clone();
                Ok(self.fail(detail)?)
            }
            other => Err(TransitionError {
                from: other.name(),
                attempted: "report",
            }
            .into()),
        }
    }

    fn secure_action(&mut self, choice: SecureChoice) -> Result<Flow, ActionError> {
        if !choice.needs_target() {
            return match choice {
                SecureChoice::ListLocks => self.list_locks(),
                SecureChoice::ShowAuditLog => self.show_audit_log(),
                _ => Ok(Flow::Stay),
            };
        }

        let question = format!(
            "File path (a plain name is looked up in {}): ",
            self.config.out_dir
        );
        let Some(input) = self.prompter.ask(&question)? else {
            return Ok(Flow::Exit);
        };
        let target = resolve_target(&input, &self.config.out_dir)?;

        match choice {
            SecureChoice::Lock => {
                self.locks.lock(&target.name)?;
                self.metrics.record_lock();
                self.prompter.say(format!("{} locked.", target.name))?;
            }
            SecureChoice::Unlock => {
                self.locks.unlock(&target.name)?;
                self.metrics.record_unlock();
                self.prompter.say(format!("{} unlocked.", target.name))?;
            }
            SecureChoice::SetReadOnly => {
                self.toggle.set_read_only(&target.path)?;
                self.metrics.record_protection_change();
                self.prompter.say(format!("{} is now read-only.", target.path))?;
            }
            SecureChoice::UnsetReadOnly => {
                self.toggle.unset_read_only(&target.path)?;
                self.metrics.record_protection_change();
                self.prompter.say(format!("{} is now writable.", target.path))?;
            }
            SecureChoice::CheckPermissions => {
                let state = self.auditor.check_permissions(&target.path)?;
                let lock = if self.locks.is_locked(&target.name) {
                    "locked"
                } else {
                    "not locked"
                };
                self.prompter
                    .say(format!("{}: {}, {}", target.path, state, lock))?;
            }
            SecureChoice::ListLocks | SecureChoice::ShowAuditLog | SecureChoice::Back => {}
        }

        Ok(Flow::Stay)
    }

    fn list_locks(&mut self) -> Result<Flow, ActionError> {
        let names = self.locks.locked_files()?;
        if names.is_empty() {
            self.prompter.say("No locked files.")?;
        }
        for name in names {
            self.prompter.say(name)?;
        }
        Ok(Flow::Stay)
    }

    fn show_audit_log(&mut self) -> Result<Flow, ActionError> {
        let entries = self.locks.audit_log().entries()?;
        if entries.is_empty() {
            self.prompter.say("Audit log is empty.")?;
        }
        for entry in entries {
            self.prompter.say(entry)?;
        }
        Ok(Flow::Stay)
    }
}
