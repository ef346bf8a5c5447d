// privscan-core/src/engines/mod.rs
//! Concrete implementations of the `DetectionEngine` trait.
//!
//! `rule_engine` holds the rule matcher used by every caller today; new
//! engines live in their own file and are declared here.

pub mod rule_engine;
