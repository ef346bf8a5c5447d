// privscan/src/main.rs
//! privscan entry point.

use clap::Parser;
use log::LevelFilter;
use std::process::ExitCode;

use privscan::cli::Cli;
use privscan::commands::CommandError;
use privscan::{build_context, logger, run};

fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = if cli.quiet {
        Some(LevelFilter::Off)
    } else if cli.debug {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    logger::init_logger(level);

    let ctx = match build_context(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(cmd_err) = e.downcast_ref::<CommandError>() {
                if !matches!(cmd_err, CommandError::MatchesFound(_)) {
                    ctx.error(cmd_err.to_string());
                }
                return ExitCode::from(cmd_err.exit_code() as u8);
            }
            ctx.error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
