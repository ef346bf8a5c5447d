// privscan/src/utils/mod.rs
pub mod clipboard;
pub mod rule_store;
