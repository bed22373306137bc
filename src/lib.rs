//! `lifedb` library crate.
//!
//! The binary (`lifedb`) is a thin wrapper around this library so that:
//!
//! - the merge core is testable without spawning processes or hitting providers
//! - provider clients sit behind traits and can be swapped for fakes
//! - code stays easy to navigate as more providers are added

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod merge;
pub mod plot;
pub mod report;
pub mod tui;
