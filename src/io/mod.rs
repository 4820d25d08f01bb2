//! Input/output helpers.
//!
//! - typed CSSE table parsing (`table`)
//! - series exports (CSV/JSON) (`export`)

pub mod export;
pub mod table;

pub use export::*;
pub use table::*;
