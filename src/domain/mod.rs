//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - CSSE file coordinates (`Metric`, `RegionScope`)
//! - long-format country series (`DailyRecord`, `CountryDailySeries`)
//! - chart parameters (`ChartColumn`, `RecoveryLag`, `DisplayWindow`, `ChartRequest`)

pub mod types;

pub use types::*;
