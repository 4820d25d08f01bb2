//! `covid-plots` library crate.
//!
//! The binary (`covid`) is a thin wrapper around this library so that:
//!
//! - loading, aggregation and chart math are testable without spawning processes
//! - SVG, ASCII and terminal renderers share one chart pipeline

pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
