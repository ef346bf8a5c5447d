// privscan/src/lib.rs
//! # privscan CLI
//!
//! The terminal front end for `privscan-core`: scans files or stdin for
//! sensitive data, writes redacted copies, and manages the on-disk rule set.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
pub mod utils;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands};
use crate::commands::AppContext;
use crate::ui::theme::build_theme_map;
use crate::utils::rule_store;

/// Builds the shared context from the global flags.
pub fn build_context(cli: &Cli) -> Result<AppContext> {
    let theme = build_theme_map(cli.theme.as_deref()).context("Failed to load theme")?;
    let rules_path = rule_store::rules_path(cli.rules_file.as_deref())?;
    log::debug!("Using rules file {}", rules_path.display());
    Ok(AppContext { rules_path, theme, quiet: cli.quiet })
}

/// Dispatches the parsed command line.
pub fn run(cli: &Cli, ctx: &AppContext) -> Result<()> {
    match &cli.command {
        Commands::Scan(cmd) => commands::scan::run_scan(ctx, cmd),
        Commands::Redact(cmd) => commands::redact::run_redact(ctx, cmd),
        Commands::Rules(cmd) => commands::rules::run_rules(ctx, cmd),
        Commands::Checker { state } => commands::rules::run_checker(ctx, *state),
    }
}
