//! Date-keyed merge of provider observations and derived series.
//!
//! Everything in here is pure: providers hand over observations, the merge
//! clamps them to the window, and series extraction projects the result.

pub mod dataset;
pub mod series;
pub mod sleep;
pub mod subject;
pub mod time_of_day;

pub use dataset::*;
pub use series::*;
pub use sleep::*;
pub use subject::*;
pub use time_of_day::*;
