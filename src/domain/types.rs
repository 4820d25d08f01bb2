//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built fresh per query from the repository tables
//! - handed to the chart/regression code by value
//! - exported to CSV/JSON

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Autoregressive self-lag used by the regression overlay.
pub const DEFAULT_SELF_LAG_DAYS: usize = 14;

/// Fraction of the peak confirmed count that opens the default display window.
pub const PEAK_CUTOFF_DIVISOR: f64 = 100.0;

/// One of the three cumulative metrics published by CSSE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Confirmed, Metric::Deaths, Metric::Recovered];

    /// Name used in `time_series_covid19_{metric}_{scope}.csv`.
    pub fn file_key(self) -> &'static str {
        match self {
            Metric::Confirmed => "confirmed",
            Metric::Deaths => "deaths",
            Metric::Recovered => "recovered",
        }
    }
}

/// Region scope of a CSSE file: the global table or the US county table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegionScope {
    Global,
    Us,
}

impl RegionScope {
    pub const ALL: [RegionScope; 2] = [RegionScope::Global, RegionScope::Us];

    pub fn file_key(self) -> &'static str {
        match self {
            RegionScope::Global => "global",
            RegionScope::Us => "US",
        }
    }
}

/// File name of the CSSE time-series CSV for a scope/metric pair.
pub fn time_series_file_name(scope: RegionScope, metric: Metric) -> String {
    format!(
        "time_series_covid19_{}_{}.csv",
        metric.file_key(),
        scope.file_key()
    )
}

/// One day of a country series.
///
/// `probably_recovered` and `infected` are derived columns. Records coming
/// straight out of the repository carry `probably_recovered = 0` and
/// `infected = confirmed - deaths - recovered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub probably_recovered: i64,
    pub infected: i64,
}

impl DailyRecord {
    pub fn raw(date: NaiveDate, confirmed: i64, deaths: i64, recovered: i64) -> Self {
        Self {
            date,
            confirmed,
            deaths,
            recovered,
            probably_recovered: 0,
            infected: confirmed - deaths - recovered,
        }
    }
}

/// Long-format daily series for one country (or a sum of countries).
///
/// Always a fresh copy: mutating it never touches the repository tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDailySeries {
    /// Display label, e.g. `Germany` or `Austria + Switzerland`.
    pub label: String,
    pub records: Vec<DailyRecord>,
    /// Metrics with no backing table for this scope (e.g. US recovered).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<Metric>,
}

impl CountryDailySeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.records.iter().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    pub fn confirmed(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.confirmed).collect()
    }

    pub fn column(&self, column: ChartColumn) -> Vec<i64> {
        self.records.iter().map(|r| column.value(r)).collect()
    }
}

/// Stackable chart columns, in their fixed drawing/palette order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartColumn {
    Infected,
    Deaths,
    Recovered,
    ProbablyRecovered,
}

impl ChartColumn {
    pub const ALL: [ChartColumn; 4] = [
        ChartColumn::Infected,
        ChartColumn::Deaths,
        ChartColumn::Recovered,
        ChartColumn::ProbablyRecovered,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartColumn::Infected => "infected",
            ChartColumn::Deaths => "deaths",
            ChartColumn::Recovered => "recovered",
            ChartColumn::ProbablyRecovered => "probably recovered",
        }
    }

    pub fn value(self, record: &DailyRecord) -> i64 {
        match self {
            ChartColumn::Infected => record.infected,
            ChartColumn::Deaths => record.deaths,
            ChartColumn::Recovered => record.recovered,
            ChartColumn::ProbablyRecovered => record.probably_recovered,
        }
    }

    /// Columns to stack for a chart.
    ///
    /// `probably recovered` is only shown when the lag correction is active,
    /// since it is identically zero otherwise.
    pub fn selection(deaths_only: bool, lag: RecoveryLag) -> Vec<ChartColumn> {
        if deaths_only {
            return vec![ChartColumn::Deaths];
        }
        ChartColumn::ALL
            .into_iter()
            .filter(|c| *c != ChartColumn::ProbablyRecovered || lag.is_enabled())
            .collect()
    }
}

/// Assumed disease duration used to reclassify stale active cases as recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecoveryLag {
    #[default]
    Disabled,
    Weeks(u32),
}

impl RecoveryLag {
    pub fn is_enabled(self) -> bool {
        matches!(self, RecoveryLag::Weeks(_))
    }

    pub fn days(self) -> Option<usize> {
        match self {
            RecoveryLag::Disabled => None,
            RecoveryLag::Weeks(w) => Some(w as usize * 7),
        }
    }

    /// Step the lag by `delta` weeks; stepping below one week disables it.
    pub fn step(self, delta: i32) -> Self {
        let current = match self {
            RecoveryLag::Disabled => 0,
            RecoveryLag::Weeks(w) => w as i64,
        };
        let next = (current + delta as i64).max(0);
        if next == 0 {
            RecoveryLag::Disabled
        } else {
            RecoveryLag::Weeks(next as u32)
        }
    }
}

impl fmt::Display for RecoveryLag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryLag::Disabled => write!(f, "off"),
            RecoveryLag::Weeks(w) => write!(f, "{w}w"),
        }
    }
}

impl FromStr for RecoveryLag {
    type Err = String;

    /// Accepts `off`/`none` or a week count (`3`, `3w`); zero weeks is `Disabled`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("off") || s.eq_ignore_ascii_case("none") {
            return Ok(RecoveryLag::Disabled);
        }
        let digits = s.strip_suffix(['w', 'W']).unwrap_or(s);
        digits
            .parse::<u32>()
            .map(|w| if w == 0 { RecoveryLag::Disabled } else { RecoveryLag::Weeks(w) })
            .map_err(|_| format!("invalid recovery lag '{s}' (expected `off` or a number of weeks)"))
    }
}

/// Left edge of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayWindow {
    /// Start at the first day with confirmed above 1% of the peak.
    #[default]
    PeakFraction,
    /// Show only the trailing N weeks.
    LastWeeks(u32),
}

impl DisplayWindow {
    /// Cycle used by the TUI `w` key.
    pub fn next(self) -> Self {
        match self {
            DisplayWindow::PeakFraction => DisplayWindow::LastWeeks(4),
            DisplayWindow::LastWeeks(w) if w < 8 => DisplayWindow::LastWeeks(8),
            DisplayWindow::LastWeeks(w) if w < 12 => DisplayWindow::LastWeeks(12),
            DisplayWindow::LastWeeks(_) => DisplayWindow::PeakFraction,
        }
    }
}

impl fmt::Display for DisplayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayWindow::PeakFraction => write!(f, "from 1% of peak"),
            DisplayWindow::LastWeeks(w) => write!(f, "last {w} weeks"),
        }
    }
}

/// Everything needed to build the chart views for one invocation.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub countries: Vec<String>,
    /// Sum all countries into a single panel instead of one panel each.
    pub combine: bool,
    /// Grid columns for multi-panel output.
    pub columns: usize,
    pub window: DisplayWindow,
    pub lag: RecoveryLag,
    pub deaths_only: bool,
    /// Peer countries for the regression overlay; empty disables it.
    pub peers: Vec<String>,
    pub self_lag_days: usize,
    /// `Us` reads `countries` and `peers` as US state names.
    pub scope: RegionScope,
}

impl Default for ChartRequest {
    fn default() -> Self {
        Self {
            countries: Vec::new(),
            combine: false,
            columns: 2,
            window: DisplayWindow::PeakFraction,
            lag: RecoveryLag::Disabled,
            deaths_only: false,
            peers: Vec::new(),
            self_lag_days: DEFAULT_SELF_LAG_DAYS,
            scope: RegionScope::Global,
        }
    }
}
