//! Shared fakes for integration tests
#![allow(dead_code)]

use opsconsole::OpsResult;
use opsconsole::services::{CommandOutput, CommandRunner, CommandSpec};
use std::sync::{Arc, Mutex};

/// Which step of the process protocol a command belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    List,
    Check,
    Kill,
}

pub fn step_of(spec: &CommandSpec) -> Step {
    match spec.program.as_str() {
        "taskkill" | "kill" => Step::Kill,
        "tasklist" if spec.args.iter().any(|arg| arg == "/FI") => Step::Check,
        "ps" if spec.args.first().is_some_and(|arg| arg == "-p") => Step::Check,
        _ => Step::List,
    }
}

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        status: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Runner returning canned output per protocol step and recording every command
pub struct ScriptedRunner {
    list: CommandOutput,
    check: CommandOutput,
    kill: CommandOutput,
    seen: Arc<Mutex<Vec<CommandSpec>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            list: ok(""),
            check: ok(""),
            kill: ok(""),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_list(mut self, stdout: &str) -> Self {
        self.list = ok(stdout);
        self
    }

    pub fn with_check(mut self, stdout: &str) -> Self {
        self.check = ok(stdout);
        self
    }

    pub fn with_check_status(mut self, code: i32, stdout: &str) -> Self {
        self.check = CommandOutput {
            status: Some(code),
            ..ok(stdout)
        };
        self
    }

    pub fn with_kill_failure(mut self, code: i32, stderr: &str) -> Self {
        self.kill = CommandOutput {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        };
        self
    }

    /// Handle on the recorded commands that stays valid after the runner moves
    pub fn log(&self) -> Arc<Mutex<Vec<CommandSpec>>> {
        Arc::clone(&self.seen)
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> OpsResult<CommandOutput> {
        self.seen.lock().unwrap().push(spec.clone());
        Ok(match step_of(spec) {
            Step::List => self.list.clone(),
            Step::Check => self.check.clone(),
            Step::Kill => self.kill.clone(),
        })
    }
}

pub fn steps(log: &Arc<Mutex<Vec<CommandSpec>>>) -> Vec<Step> {
    log.lock().unwrap().iter().map(step_of).collect()
}

/// `tasklist /FO CSV` output for the given processes
pub fn tasklist_csv(processes: &[(&str, u32)]) -> String {
    let mut out = String::from("\"Image Name\",\"PID\",\"Session Name\",\"Session#\",\"Mem Usage\"\r\n");
    for (name, pid) in processes {
        out.push_str(&format!(
            "\"{}\",\"{}\",\"Console\",\"1\",\"10,240 K\"\r\n",
            name, pid
        ));
    }
    out
}

/// `ps -o pid=,comm=` output for the given processes
pub fn ps_columns(processes: &[(&str, u32)]) -> String {
    processes
        .iter()
        .map(|(name, pid)| format!("{:>5} {}\n", pid, name))
        .collect()
}
