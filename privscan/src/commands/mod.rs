// privscan/src/commands/mod.rs
//! Command implementations and the helpers they share.

pub mod redact;
pub mod rules;
pub mod scan;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

/// Failures that map to a specific exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    /// `scan --fail-on-match` found something. The report is already printed.
    #[error("{0} sensitive match(es) found")]
    MatchesFound(usize),
    #[error("refusing to {0} without --yes")]
    ConfirmationRequired(&'static str),
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::MatchesFound(_) => 2,
            CommandError::ConfirmationRequired(_) => 1,
        }
    }
}

/// State every command needs: where the rules live, how to colour output,
/// and whether informational messages are wanted.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub rules_path: PathBuf,
    pub theme: ThemeMap,
    pub quiet: bool,
}

impl AppContext {
    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            let color = io::stderr().is_terminal();
            let _ = output_format::print_info_message(&mut io::stderr(), msg.as_ref(), &self.theme, color);
        }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            let color = io::stderr().is_terminal();
            let _ = output_format::print_success_message(&mut io::stderr(), msg.as_ref(), &self.theme, color);
        }
    }

    /// Warnings are shown even in quiet mode.
    pub fn warn(&self, msg: impl AsRef<str>) {
        let color = io::stderr().is_terminal();
        let _ = output_format::print_warn_message(&mut io::stderr(), msg.as_ref(), &self.theme, color);
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        let color = io::stderr().is_terminal();
        let _ = output_format::print_error_message(&mut io::stderr(), msg.as_ref(), &self.theme, color);
    }
}

/// Reads the whole input from a file, or from stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
