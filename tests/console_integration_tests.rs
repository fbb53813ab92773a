//! Integration tests for the interactive console
//!
//! Scripted operator input is fed through the menus and the printed output
//! and side effects are checked.

mod common;

use camino::Utf8PathBuf;
use common::{ScriptedRunner, Step, ps_columns, steps};
use opsconsole::platform::PlatformFamily;
use opsconsole::services::{
    LockRegistry, OsCommandAdapter, UnsupportedProtection, UnsupportedRunner, backend_for,
    protection_backend,
};
use opsconsole::{Console, ConsoleConfig, Metrics};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

struct Session {
    output: String,
    metrics: Arc<Metrics>,
}

fn run_session(runner: ScriptedRunner, out_dir: &Utf8PathBuf, script: impl AsRef<[u8]>) -> Session {
    let config = ConsoleConfig {
        out_dir: out_dir.clone(),
        ..ConsoleConfig::default()
    };
    let adapter = OsCommandAdapter::new(backend_for(PlatformFamily::Posix), runner);
    let protection = protection_backend(PlatformFamily::detect().unwrap()).unwrap();
    let metrics = Arc::new(Metrics::new());

    let mut console = Console::new(
        config,
        adapter,
        protection,
        Arc::clone(&metrics),
        script.as_ref(),
        Vec::new(),
    )
    .unwrap();
    console.run().unwrap();

    Session {
        output: String::from_utf8(console.into_output()).unwrap(),
        metrics,
    }
}

fn create_test_out_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, out_dir)
}

#[test]
fn test_list_respects_count() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    let runner = ScriptedRunner::new().with_list(&ps_columns(&[
        ("init", 1),
        ("bash", 200),
        ("vim", 300),
    ]));

    let session = run_session(runner, &out_dir, "1\n1\n2\n4\n3\n");

    assert!(session.output.contains("PID\tNAME"));
    assert!(session.output.contains("1\tinit"));
    assert!(session.output.contains("200\tbash"));
    assert!(!session.output.contains("300\tvim"));
    assert!(session.output.ends_with("Goodbye.\n"));
    assert_eq!(session.metrics.processes_listed.load(Ordering::Relaxed), 2);
}

#[test]
fn test_filter_prints_matches_and_rejects_empty() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    let runner = ScriptedRunner::new().with_list(&ps_columns(&[
        ("Google Chrome", 88),
        ("Finder", 90),
    ]));

    let session = run_session(runner, &out_dir, "1\n2\nCHROME\n2\n\n4\n3\n");

    assert!(session.output.contains("88\tGoogle Chrome"));
    assert!(!session.output.contains("90\tFinder"));
    assert!(session.output.contains("Error: Invalid input: search keyword is empty"));
    assert_eq!(session.metrics.filters_run.load(Ordering::Relaxed), 1);
    assert_eq!(session.metrics.failures.load(Ordering::Relaxed), 1);
}

#[test]
fn test_kill_of_absent_pid_never_kills() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    let runner = ScriptedRunner::new().with_check_status(1, "");
    let log = runner.log();

    let session = run_session(runner, &out_dir, "1\n3\n9999\n4\n3\n");

    assert!(session.output.contains("Error: Not found: no process with PID 9999"));
    assert!(!session.output.contains("Type 'yes'"));
    assert_eq!(steps(&log), vec![Step::Check]);
}

#[test]
fn test_confirmed_kill_then_eof() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    let runner = ScriptedRunner::new().with_check(&ps_columns(&[("sleep", 1001)]));
    let log = runner.log();

    let session = run_session(runner, &out_dir, "1\n3\n1001\nyes\n");

    assert!(session.output.contains("Found process 1001\tsleep"));
    assert!(session.output.contains("Process 1001 (sleep) terminated."));
    assert!(session.output.ends_with("Goodbye.\n"));
    assert_eq!(steps(&log), vec![Step::Check, Step::Kill]);
    assert_eq!(session.metrics.kills_succeeded.load(Ordering::Relaxed), 1);
}

#[test]
fn test_declined_kill_and_bad_pid() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    let runner = ScriptedRunner::new().with_check(&ps_columns(&[("sleep", 1001)]));
    let log = runner.log();

    let session = run_session(runner, &out_dir, "1\n3\nabc\n3\n1001\nno\n4\n3\n");

    assert!(session.output.contains("Error: Invalid input: 'abc' is not a valid PID"));
    assert!(session.output.contains("Termination cancelled."));
    assert_eq!(steps(&log), vec![Step::Check]);
    assert_eq!(session.metrics.kills_attempted.load(Ordering::Relaxed), 1);
}

#[test]
fn test_lock_twice_then_list_and_audit() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    fs::write(out_dir.join("report.txt"), "quarterly").unwrap();

    let script = "2\n1\nreport.txt\n1\nreport.txt\n6\n7\n8\n3\n";
    let session = run_session(ScriptedRunner::new(), &out_dir, script);

    assert!(session.output.contains("report.txt locked."));
    assert!(session.output.contains("Error: Already exists: report.txt is already locked"));
    assert!(session.output.contains("] LOCK report.txt"));
    assert_eq!(session.output.matches("] LOCK report.txt").count(), 1);

    let registry = LockRegistry::new(&out_dir);
    assert_eq!(registry.locked_files().unwrap(), vec!["report.txt"]);
    assert_eq!(registry.audit_log().entries().unwrap().len(), 1);
}

#[test]
fn test_unlock_of_unlocked_file_reports_error() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    fs::write(out_dir.join("notes.txt"), "n").unwrap();

    let session = run_session(ScriptedRunner::new(), &out_dir, "2\n2\nnotes.txt\n7\n8\n3\n");

    assert!(session.output.contains("Error: Not found: notes.txt is not locked"));
    assert!(session.output.contains("Audit log is empty."));
}

#[test]
fn test_protection_and_lock_status_report() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    fs::write(out_dir.join("config.ini"), "a=1").unwrap();

    let script = "2\n3\nconfig.ini\n5\nconfig.ini\n4\nconfig.ini\n5\nconfig.ini\n8\n3\n";
    let session = run_session(ScriptedRunner::new(), &out_dir, script);

    let path = out_dir.join("config.ini");
    assert!(session.output.contains(&format!("{} is now read-only.", path)));
    assert!(session.output.contains(&format!("{}: read-only, not locked", path)));
    assert!(session.output.contains(&format!("{}: writable, not locked", path)));
    assert_eq!(session.metrics.protection_changes.load(Ordering::Relaxed), 2);
    assert!(!LockRegistry::new(&out_dir).audit_log().path().exists());
}

#[test]
fn test_missing_file_and_invalid_options() {
    let (_temp_dir, out_dir) = create_test_out_dir();

    let session = run_session(ScriptedRunner::new(), &out_dir, "9\n2\n1\nghost.txt\n42\n");

    assert!(session.output.contains("Invalid option"));
    assert!(session.output.contains("Error: Not found: no such file"));
    assert!(session.output.ends_with("Goodbye.\n"));
    assert_eq!(LockRegistry::new(&out_dir).locked_files().unwrap().len(), 0);
}

#[test]
fn test_non_utf8_path_is_reported_and_session_continues() {
    let (_temp_dir, out_dir) = create_test_out_dir();

    let session = run_session(ScriptedRunner::new(), &out_dir, b"2\n1\nr\xe9port.txt\n8\n3\n");

    assert!(session.output.contains("Error: Not found: no such file"));
    assert!(session.output.ends_with("Goodbye.\n"));
    assert_eq!(session.metrics.failures.load(Ordering::Relaxed), 1);
}

#[test]
fn test_pid_zero_is_rejected_before_any_command() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    let runner = ScriptedRunner::new().with_check(&ps_columns(&[("kernel_task", 0)]));
    let log = runner.log();

    let session = run_session(runner, &out_dir, "1\n3\n0\n4\n3\n");

    assert!(session.output.contains("Error: Invalid input: PID 0 is not a process"));
    assert!(!session.output.contains("Type 'yes'"));
    assert!(steps(&log).is_empty());
    assert_eq!(session.metrics.kills_attempted.load(Ordering::Relaxed), 0);
}

#[test]
fn test_unknown_os_keeps_locks_and_reports_unsupported() {
    let (_temp_dir, out_dir) = create_test_out_dir();
    fs::write(out_dir.join("report.txt"), "quarterly").unwrap();
    let config = ConsoleConfig {
        out_dir: out_dir.clone(),
        ..ConsoleConfig::default()
    };
    let adapter = OsCommandAdapter::new(
        backend_for(PlatformFamily::Posix),
        UnsupportedRunner::new("haiku"),
    );
    let metrics = Arc::new(Metrics::new());

    let script = "1\n1\n\n4\n2\n3\nreport.txt\n1\nreport.txt\n7\n8\n3\n";
    let mut console = Console::new(
        config,
        adapter,
        Arc::new(UnsupportedProtection::new("haiku")),
        Arc::clone(&metrics),
        script.as_bytes(),
        Vec::new(),
    )
    .unwrap()
    .with_platform_label("unsupported: haiku");
    console.run().unwrap();
    let output = String::from_utf8(console.into_output()).unwrap();

    assert!(output.contains("(unsupported: haiku)"));
    assert_eq!(
        output
            .matches("Error: Unsupported operating system: haiku")
            .count(),
        2
    );
    assert!(output.contains("report.txt locked."));
    assert!(output.contains("] LOCK report.txt"));
    assert!(LockRegistry::new(&out_dir).is_locked("report.txt"));
    assert_eq!(metrics.failures.load(Ordering::Relaxed), 2);
}
