//! Chart data preparation: lag correction, display window, regression overlay.
//!
//! Everything here is pure: inputs are borrowed series, outputs are fresh values.

pub mod adjust;
pub mod regression;
pub mod window;

pub use adjust::*;
pub use regression::*;
pub use window::*;
