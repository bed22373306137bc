//! Input/output helpers.
//!
//! - dataset JSON snapshot read/write (`dataset`)
//! - per-date series exports to CSV (`export`)

pub mod dataset;
pub mod export;

pub use dataset::*;
pub use export::*;
