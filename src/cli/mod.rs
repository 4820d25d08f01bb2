//! Command-line parsing for the CSSE COVID-19 chart tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data/chart code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ChartRequest, DisplayWindow, RecoveryLag, RegionScope, DEFAULT_SELF_LAG_DAYS};
use crate::plot::DEFAULT_PANEL_SIZE;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "COVID-19 stacked-area charts from CSSE time series")]
pub struct Cli {
    /// CSSE COVID-19 checkout (default: $CSSE_DATA_DIR, then ../COVID-19).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all countries/regions in the global dataset (or US states with `--us`).
    Countries(CountriesArgs),
    /// Render stacked-area charts to an SVG file.
    Plot(PlotArgs),
    /// Print an ASCII chart in the terminal.
    Show(ShowArgs),
    /// Write the adjusted series to CSV (`.csv`) or JSON.
    Export(ExportArgs),
    /// Browse countries interactively.
    ///
    /// Renders the same stacked-area chart as `covid plot` into a terminal UI
    /// using Ratatui.
    Tui(TuiArgs),
}

/// Options for `covid countries`.
#[derive(Debug, Args, Clone)]
pub struct CountriesArgs {
    /// List US states from the US tables instead.
    #[arg(long)]
    pub us: bool,
}

/// Options shared by every chart-building command.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Countries/regions as named in the CSSE global tables (e.g. "Korea, South").
    #[arg(required = true, value_name = "COUNTRY")]
    pub countries: Vec<String>,

    /// Sum all countries into a single chart.
    #[arg(long)]
    pub combine: bool,

    /// Show only the last N weeks (default: start at 1% of peak confirmed).
    #[arg(long)]
    pub weeks: Option<u32>,

    /// Assumed disease duration in weeks for the recovery-lag correction, or `off`.
    #[arg(long, default_value_t = RecoveryLag::Disabled)]
    pub lag: RecoveryLag,

    /// Chart deaths only.
    #[arg(long)]
    pub deaths_only: bool,

    /// Peer countries for the regression overlay (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "COUNTRY")]
    pub peers: Vec<String>,

    /// Self-lag (days) of the autoregressive term in the regression overlay.
    #[arg(long, default_value_t = DEFAULT_SELF_LAG_DAYS)]
    pub self_lag_days: usize,

    /// Read COUNTRY and --peers as US states (summed over counties).
    #[arg(long)]
    pub us: bool,
}

impl ChartArgs {
    pub fn to_request(&self, columns: usize) -> ChartRequest {
        ChartRequest {
            countries: self.countries.clone(),
            combine: self.combine,
            columns,
            window: window_from_weeks(self.weeks),
            lag: self.lag,
            deaths_only: self.deaths_only,
            peers: self.peers.clone(),
            self_lag_days: self.self_lag_days,
            scope: scope_from_flag(self.us),
        }
    }
}

/// Options for `covid plot`.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub chart: ChartArgs,

    /// Grid columns when charting several countries.
    #[arg(long, default_value_t = 2)]
    pub columns: usize,

    /// Output SVG file.
    #[arg(long, short = 'o', default_value = "covid.svg")]
    pub out: PathBuf,

    /// Panel width (pixels).
    #[arg(long, default_value_t = DEFAULT_PANEL_SIZE.0)]
    pub width: u32,

    /// Panel height (pixels).
    #[arg(long, default_value_t = DEFAULT_PANEL_SIZE.1)]
    pub height: u32,

    /// Also print an ASCII preview of each chart.
    #[arg(long)]
    pub ascii: bool,
}

/// Options for `covid show`.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub chart: ChartArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for `covid export`.
#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub chart: ChartArgs,

    /// Output file; `.csv` writes CSV, anything else JSON.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: PathBuf,
}

/// Options for `covid tui`.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Country selected on start.
    #[arg(value_name = "COUNTRY")]
    pub country: Option<String>,

    /// Show only the last N weeks (default: start at 1% of peak confirmed).
    #[arg(long)]
    pub weeks: Option<u32>,

    /// Assumed disease duration in weeks for the recovery-lag correction, or `off`.
    #[arg(long, default_value_t = RecoveryLag::Disabled)]
    pub lag: RecoveryLag,

    /// Chart deaths only.
    #[arg(long)]
    pub deaths_only: bool,
}

pub fn scope_from_flag(us: bool) -> RegionScope {
    if us { RegionScope::Us } else { RegionScope::Global }
}

pub fn window_from_weeks(weeks: Option<u32>) -> DisplayWindow {
    match weeks {
        Some(w) => DisplayWindow::LastWeeks(w),
        None => DisplayWindow::PeakFraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_args_build_request() {
        let cli = Cli::parse_from([
            "covid", "plot", "Germany", "Italy", "--weeks", "6", "--lag", "3", "--peers",
            "Austria,Switzerland", "--columns", "3",
        ]);
        let Command::Plot(args) = cli.command else {
            panic!("expected plot");
        };
        let request = args.chart.to_request(args.columns);
        assert_eq!(request.countries, vec!["Germany", "Italy"]);
        assert_eq!(request.window, DisplayWindow::LastWeeks(6));
        assert_eq!(request.lag, RecoveryLag::Weeks(3));
        assert_eq!(request.peers, vec!["Austria", "Switzerland"]);
        assert_eq!(request.columns, 3);
        assert_eq!(request.self_lag_days, DEFAULT_SELF_LAG_DAYS);
    }

    #[test]
    fn defaults_match_peak_window_without_lag() {
        let cli = Cli::parse_from(["covid", "--data-dir", "/tmp/x", "show", "US"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        let request = args.chart.to_request(2);
        assert_eq!(request.window, DisplayWindow::PeakFraction);
        assert_eq!(request.lag, RecoveryLag::Disabled);
        assert!(request.peers.is_empty());
        assert_eq!(request.scope, RegionScope::Global);
    }

    #[test]
    fn us_flag_switches_to_states() {
        let cli = Cli::parse_from(["covid", "export", "New York", "--us", "-o", "ny.csv"]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.chart.to_request(1).scope, RegionScope::Us);

        let cli = Cli::parse_from(["covid", "countries", "--us"]);
        let Command::Countries(args) = cli.command else {
            panic!("expected countries");
        };
        assert!(args.us);
    }
}
