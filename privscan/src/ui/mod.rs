// privscan/src/ui/mod.rs
pub mod diff_viewer;
pub mod match_table;
pub mod output_format;
pub mod rules_table;
pub mod theme;
