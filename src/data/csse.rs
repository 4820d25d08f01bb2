//! CSSE COVID-19 time-series repository.
//!
//! Expects a checkout of <https://github.com/CSSEGISandData/COVID-19>:
//!
//! ```text
//! <repo>/csse_covid_19_data/csse_covid_19_time_series/
//!     time_series_covid19_{confirmed|deaths|recovered}_{global|US}.csv
//! ```
//!
//! All six files are read eagerly on construction; the tables are immutable
//! afterwards and every query returns a freshly built series.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::{time_series_file_name, CountryDailySeries, DailyRecord, Metric, RegionScope};
use crate::error::DataError;
use crate::io::table::{RegionMetricTable, RegionRow};

/// Path of the time-series directory inside a CSSE checkout.
pub const TIME_SERIES_SUBDIR: [&str; 2] = ["csse_covid_19_data", "csse_covid_19_time_series"];

/// Environment variable consulted when no `--data-dir` is given.
pub const DATA_DIR_ENV: &str = "CSSE_DATA_DIR";

/// Default checkout location: `COVID-19` next to the current directory.
pub fn default_repo_dir() -> PathBuf {
    Path::new("..").join("COVID-19")
}

/// Resolve the checkout location: explicit flag, then `CSSE_DATA_DIR` (`.env` honoured), then default.
pub fn resolve_repo_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    dotenvy::dotenv().ok();
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => {
            info!(
                "Assuming checkout of https://github.com/CSSEGISandData/COVID-19 at {}",
                default_repo_dir().display()
            );
            default_repo_dir()
        }
    }
}

/// In-memory CSSE tables, keyed by `(scope, metric)`.
#[derive(Debug, Clone)]
pub struct TimeSeriesRepository {
    tables: HashMap<(RegionScope, Metric), RegionMetricTable>,
}

impl TimeSeriesRepository {
    /// Locate the checkout and load every available table.
    ///
    /// Missing individual files are logged and skipped (the US recovered file
    /// does not exist upstream). A missing checkout or time-series directory is fatal.
    pub fn open(repo_dir: impl Into<PathBuf>) -> Result<Self, DataError> {
        let repo_dir = repo_dir.into();
        if !repo_dir.is_dir() {
            return Err(DataError::DataSourceNotFound {
                what: "CSSE data repo (https://github.com/CSSEGISandData/COVID-19)",
                path: repo_dir,
            });
        }

        let ts_dir = TIME_SERIES_SUBDIR
            .iter()
            .fold(repo_dir.clone(), |dir, part| dir.join(part));
        if !ts_dir.is_dir() {
            return Err(DataError::DataSourceNotFound {
                what: "CSSE time-series data",
                path: ts_dir,
            });
        }

        let mut tables = HashMap::new();
        for scope in RegionScope::ALL {
            for metric in Metric::ALL {
                let path = ts_dir.join(time_series_file_name(scope, metric));
                if !path.exists() {
                    warn!(
                        "Failed locating data file for {}/{} (expected for US/recovered): {}",
                        scope.file_key(),
                        metric.file_key(),
                        path.display()
                    );
                    continue;
                }
                let table = RegionMetricTable::load(&path, scope, metric)?;
                debug!(
                    rows = table.rows().len(),
                    dates = table.dates().len(),
                    "loaded {}",
                    path.display()
                );
                tables.insert((scope, metric), table);
            }
        }

        info!(
            "Loaded {} CSSE tables from {}",
            tables.len(),
            ts_dir.display()
        );

        Ok(Self { tables })
    }

    /// Build a repository from already-parsed tables.
    pub fn from_tables(tables: Vec<RegionMetricTable>) -> Self {
        let tables = tables
            .into_iter()
            .map(|t| ((t.scope, t.metric), t))
            .collect();
        Self { tables }
    }

    pub fn table(&self, scope: RegionScope, metric: Metric) -> Option<&RegionMetricTable> {
        self.tables.get(&(scope, metric))
    }

    /// Distinct country names in the global confirmed table.
    pub fn countries(&self) -> BTreeSet<String> {
        self.table(RegionScope::Global, Metric::Confirmed)
            .map(|t| t.rows().iter().map(|r| r.country.clone()).collect())
            .unwrap_or_default()
    }

    /// Distinct US states/territories in the US confirmed table.
    pub fn states(&self) -> BTreeSet<String> {
        self.table(RegionScope::Us, Metric::Confirmed)
            .map(|t| t.rows().iter().filter_map(|r| r.province.clone()).collect())
            .unwrap_or_default()
    }

    pub fn data_for_country(&self, name: &str) -> CountryDailySeries {
        self.data_for_countries(&[name])
    }

    /// Sum of all global rows (provinces included) whose country is in `names`.
    pub fn data_for_countries<S: AsRef<str>>(&self, names: &[S]) -> CountryDailySeries {
        self.aggregate(RegionScope::Global, names, |row, name| row.country == name)
    }

    /// Names accepted by `data_for_scope`: countries, or US states.
    pub fn names_in(&self, scope: RegionScope) -> BTreeSet<String> {
        match scope {
            RegionScope::Global => self.countries(),
            RegionScope::Us => self.states(),
        }
    }

    /// `data_for_countries` or `data_for_states`, depending on `scope`.
    pub fn data_for_scope<S: AsRef<str>>(&self, scope: RegionScope, names: &[S]) -> CountryDailySeries {
        match scope {
            RegionScope::Global => self.data_for_countries(names),
            RegionScope::Us => self.data_for_states(names),
        }
    }

    /// Sum of all US rows (counties) whose state is in `names`.
    ///
    /// The upstream US data has no recovered file, so these series usually
    /// list `Metric::Recovered` as unavailable and carry zero recovered.
    pub fn data_for_states<S: AsRef<str>>(&self, names: &[S]) -> CountryDailySeries {
        self.aggregate(RegionScope::Us, names, |row, name| {
            row.province.as_deref() == Some(name)
        })
    }

    fn aggregate<S, F>(&self, scope: RegionScope, names: &[S], matches: F) -> CountryDailySeries
    where
        S: AsRef<str>,
        F: Fn(&RegionRow, &str) -> bool,
    {
        let label = names
            .iter()
            .map(|n| n.as_ref())
            .collect::<Vec<_>>()
            .join(" + ");
        let keep = |row: &RegionRow| names.iter().any(|n| matches(row, n.as_ref()));

        // The confirmed table defines the date axis.
        let Some(axis) = self.table(scope, Metric::Confirmed) else {
            warn!("No {} confirmed table loaded; '{label}' is empty", scope.file_key());
            return CountryDailySeries {
                label,
                records: Vec::new(),
                unavailable: Metric::ALL.to_vec(),
            };
        };

        let unmatched: Vec<&str> = names
            .iter()
            .map(|n| n.as_ref())
            .filter(|n| axis.sum_rows(|row| matches(row, n)).1 == 0)
            .collect();
        if !unmatched.is_empty() {
            warn!(
                "No {} rows match {}; their counts are zero",
                scope.file_key(),
                unmatched.join(", ")
            );
        }

        let mut sums: HashMap<Metric, HashMap<chrono::NaiveDate, i64>> = HashMap::new();
        let mut unavailable = Vec::new();
        for metric in Metric::ALL {
            match self.table(scope, metric) {
                Some(table) => {
                    let (by_date, _) = table.sum_rows(&keep);
                    sums.insert(metric, by_date);
                }
                None => unavailable.push(metric),
            }
        }

        let value = |metric: Metric, date: &chrono::NaiveDate| -> i64 {
            sums.get(&metric)
                .and_then(|m| m.get(date))
                .copied()
                .unwrap_or(0)
        };

        let records = axis
            .dates()
            .iter()
            .map(|date| {
                DailyRecord::raw(
                    *date,
                    value(Metric::Confirmed, date),
                    value(Metric::Deaths, date),
                    value(Metric::Recovered, date),
                )
            })
            .collect();

        CountryDailySeries {
            label,
            records,
            unavailable,
        }
    }
}
