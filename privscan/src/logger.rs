// privscan/src/logger.rs
//! Logging setup for the privscan binary.
//!
//! `RUST_LOG` is honoured unless an explicit level is passed; `--debug` and
//! `--quiet` map to `Debug` and `Off`. Initialisation is idempotent so tests
//! that drive command functions directly can call it freely.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initialises the global logger, writing to stderr.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).target(env_logger::Target::Stderr);
    // A second call (e.g. from tests) keeps the first logger.
    let _ = builder.try_init();
}
