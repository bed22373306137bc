//! Reporting utilities: dataset tables and collect summaries for the terminal.

pub mod format;

pub use format::*;
