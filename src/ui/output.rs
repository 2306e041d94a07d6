//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Status messages respect the quiet flag; command results are always
//! printed. When `--json` is enabled, results are machine-readable JSON.

use std::fmt::Display;

use serde::Serialize;

use crate::access::{FileEntry, FileKind};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a status message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a value as pretty JSON on stdout.
pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format one directory entry as a listing line.
///
/// Directories get a trailing `/` and no size.
pub fn format_entry(entry: &FileEntry) -> String {
    let marker = match entry.kind {
        FileKind::Dir => 'd',
        FileKind::File => '-',
        FileKind::Symlink => 'l',
        FileKind::Other => '?',
    };
    let size = if entry.is_dir() {
        "-".to_string()
    } else {
        entry.len.to_string()
    };
    let suffix = if entry.is_dir() { "/" } else { "" };
    format!("{} {:>10} {}{}", marker, size, entry.path.display(), suffix)
}

/// Format a tag list, marking the selected tag with `*`.
pub fn format_tags<T: Display>(tags: &[T], selected: Option<&str>) -> String {
    tags.iter()
        .map(|tag| {
            let tag = tag.to_string();
            let mark = if Some(tag.as_str()) == selected { "*" } else { " " };
            format!("{} {}", mark, tag)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
