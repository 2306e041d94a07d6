//! cli
//!
//! Command-line interface layer for revscope.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the logging subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! [`commands`], which open a [`crate::access::VersionedRepo`] and print what
//! it returns.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::access::RepoSource;
use crate::ui::output::Verbosity;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "REVSCOPE_LOG";

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Repository to read.
    pub source: RepoSource,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// JSON output.
    pub json: bool,
    /// Ping a local repository's remote before reading.
    pub verify_remote: bool,
}

impl Context {
    /// Output verbosity for this invocation.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            source: RepoSource::Local(PathBuf::from(".")),
            debug: false,
            quiet: false,
            json: false,
            verify_remote: true,
        }
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = Context {
        source: source_from(&cli),
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json,
        verify_remote: !cli.no_verify_remote,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Where to read from: `--remote` is always cloned; `--repo` may name
/// either a working copy or a URL.
fn source_from(cli: &Cli) -> RepoSource {
    match (&cli.remote, &cli.repo) {
        (Some(url), _) => RepoSource::Remote(url.clone()),
        (None, Some(location)) => RepoSource::parse(location),
        (None, None) => RepoSource::Local(PathBuf::from(".")),
    }
}

/// Install a stderr subscriber.
///
/// `$REVSCOPE_LOG` takes precedence; otherwise `--debug` enables debug
/// output for this crate and everything else stays at `warn`.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("warn,revscope=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
