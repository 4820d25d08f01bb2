//! Data sources.
//!
//! - `csse`: the CSSE COVID-19 time-series checkout (`TimeSeriesRepository`)

pub mod csse;

pub use csse::*;
