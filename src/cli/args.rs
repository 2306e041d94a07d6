//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--repo <path|url>`: Use this working copy (or clone this URL) instead
//!   of the current directory
//! - `--remote <url>`: Clone this repository into a temporary directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output
//! - `--no-verify-remote`: Skip pinging a local repository's remote

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// revscope - Read a git repository's files as of any revision
#[derive(Parser, Debug)]
#[command(name = "revscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Working copy to read, or a URL to clone (defaults to the current
    /// directory)
    #[arg(long, global = true, conflicts_with = "remote")]
    pub repo: Option<String>,

    /// Clone this repository into a temporary directory and read that
    #[arg(long, global = true)]
    pub remote: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Do not ping the remote of a local repository before reading it
    #[arg(long, global = true)]
    pub no_verify_remote: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the revisions compared by default: latest release tag vs working tree
    Defaults,

    /// List the repository's semantic-version tags in ascending order
    Tags,

    /// List a directory as of a revision
    Ls {
        /// Revision to read ("." for the working tree as it is)
        #[arg(short, long, default_value = ".")]
        rev: String,

        /// Directory relative to the repository root (defaults to the root)
        path: Option<PathBuf>,
    },

    /// Print a file as of a revision
    Cat {
        /// Revision to read ("." for the working tree as it is)
        #[arg(short, long, default_value = ".")]
        rev: String,

        /// File relative to the repository root
        path: PathBuf,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ls_defaults_to_working_tree_root() {
        let cli = Cli::try_parse_from(["revscope", "ls"]).unwrap();
        match cli.command {
            Command::Ls { rev, path } => {
                assert_eq!(rev, ".");
                assert!(path.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cat_requires_path() {
        assert!(Cli::try_parse_from(["revscope", "cat", "--rev", "v1.0.0"]).is_err());
    }

    #[test]
    fn repo_and_remote_conflict() {
        let result = Cli::try_parse_from([
            "revscope",
            "--repo",
            ".",
            "--remote",
            "https://example.com/x.git",
            "tags",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["revscope", "defaults", "--json", "-q"]).unwrap();
        assert!(cli.json);
        assert!(cli.quiet);
    }
}
