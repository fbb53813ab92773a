//! OpsConsole - interactive operator console
//!
//! Main entry point for the terminal application.
//!
//! # Execution Flow
//!
//! 1. Parse command line flags
//! 2. Initialize logging → `<log-dir>/opsconsole.log.<date>`
//! 3. Load `opsconsole.yaml` (defaults when missing) and create the out directory
//! 4. Detect the platform family and build its process and protection backends;
//!    on an unknown OS those actions report `Unsupported` and locks still work
//! 5. Run the menu loop on stdin/stdout until Quit or end of input
//! 6. Log the session summary
//!
//! Lock markers and `audit.log` live in the configured out directory.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use opsconsole::config::DEFAULT_CONFIG_FILE;
use opsconsole::logging::{LOG_PREFIX, setup_logging_with_console};
use opsconsole::services::{
    CommandRunner, OsCommandAdapter, ProtectionBackend, SystemCommandRunner, UnsupportedProtection,
    UnsupportedRunner, backend_for, protection_backend,
};
use opsconsole::{APP_NAME, ConfigManager, Console, ConsoleConfig, Metrics, PlatformFamily, VERSION};
use std::io;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "opsconsole", version, about = "Process control and secure file operations")]
struct Args {
    /// YAML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: Utf8PathBuf,

    /// Directory for diagnostic log files
    #[arg(long, default_value = "logs")]
    log_dir: Utf8PathBuf,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Do not mirror log records to stderr
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _guard = setup_logging_with_console(&args.log_dir, LOG_PREFIX, args.debug, !args.quiet)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(&args.config);
    let config = config_manager.load();
    config_manager.ensure_out_dir(&config)?;

    let metrics = Arc::new(Metrics::new());

    match PlatformFamily::detect() {
        Ok(family) => {
            tracing::info!("Platform family: {}", family);
            let adapter = OsCommandAdapter::new(backend_for(family), SystemCommandRunner);
            let protection = protection_backend(family)
                .with_context(|| format!("No protection backend for {}", family))?;
            run_console(config, adapter, protection, &metrics, None)?;
        }
        Err(e) => {
            let os = std::env::consts::OS;
            tracing::warn!("{}; process and protection actions are disabled", e);
            let adapter =
                OsCommandAdapter::new(backend_for(PlatformFamily::Posix), UnsupportedRunner::new(os));
            let protection = Arc::new(UnsupportedProtection::new(os));
            run_console(config, adapter, protection, &metrics, Some(format!("unsupported: {}", os)))?;
        }
    }

    metrics.log_summary();
    tracing::info!("Application exited normally");

    Ok(())
}

/// Run the menu loop on stdin/stdout.
fn run_console<R: CommandRunner>(
    config: ConsoleConfig,
    adapter: OsCommandAdapter<R>,
    protection: Arc<dyn ProtectionBackend>,
    metrics: &Arc<Metrics>,
    platform_label: Option<String>,
) -> Result<()> {
    let stdin = io::stdin();
    let mut console = Console::new(
        config,
        adapter,
        protection,
        Arc::clone(metrics),
        stdin.lock(),
        io::stdout(),
    )
    .context("Failed to start the console")?;

    if let Some(label) = platform_label {
        console = console.with_platform_label(label);
    }

    console.run().context("Terminal I/O failed")
}
