//! Typed parsing of the wide CSSE time-series CSVs.
//!
//! Each file is one metric for one region scope:
//!
//! ```text
//! Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,...
//! ,Afghanistan,33.93911,67.709953,0,0,...
//! ```
//!
//! The US files carry more metadata (`UID`, `FIPS`, `Admin2`, `Combined_Key`,
//! `Population`, ...) and spell the country column `Country_Region`. Both
//! layouts are normalized to the same typed table:
//!
//! - metadata columns: only country and province are kept
//! - date columns: any header shaped like `M/D/YY`, parsed to `NaiveDate` up front
//! - cells: integer counts (empty cells count as zero)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use csv::StringRecord;
use regex::Regex;

use crate::domain::{Metric, RegionScope};
use crate::error::DataError;

const COUNTRY_HEADERS: [&str; 2] = ["country/region", "country_region"];
const PROVINCE_HEADERS: [&str; 2] = ["province/state", "province_state"];

static DATE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+/[0-9]+/[0-9]+$").expect("static regex"));

/// One location row of a wide table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRow {
    pub country: String,
    pub province: Option<String>,
    /// One value per table date, same order as `RegionMetricTable::dates`.
    pub values: Vec<i64>,
}

/// One metric for one region scope, rows × dates.
#[derive(Debug, Clone)]
pub struct RegionMetricTable {
    pub scope: RegionScope,
    pub metric: Metric,
    dates: Vec<NaiveDate>,
    rows: Vec<RegionRow>,
}

impl RegionMetricTable {
    /// Read and parse a table from disk.
    pub fn load(path: &Path, scope: RegionScope, metric: Metric) -> Result<Self, DataError> {
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_reader(file, &label, scope, metric)
    }

    /// Parse a table from any reader; `source` names it in error messages.
    pub fn from_reader<R: Read>(
        reader: R,
        source: &str,
        scope: RegionScope,
        metric: Metric,
    ) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| csv_error(source, e))?
            .clone();
        let layout = HeaderLayout::resolve(&headers, source)?;

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // records() starts after the header line; CSV lines are 1-based.
            let line = idx + 2;
            let record = result.map_err(|e| csv_error(source, e))?;
            rows.push(layout.parse_row(&record, &headers, source, line)?);
        }

        Ok(Self {
            scope,
            metric,
            dates: layout.dates,
            rows,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn rows(&self) -> &[RegionRow] {
        &self.rows
    }

    /// Sum every date column over the rows accepted by `keep`.
    ///
    /// Returns the per-date totals keyed by date plus the number of matched rows.
    pub fn sum_rows<F>(&self, keep: F) -> (HashMap<NaiveDate, i64>, usize)
    where
        F: Fn(&RegionRow) -> bool,
    {
        let mut totals = vec![0i64; self.dates.len()];
        let mut matched = 0usize;
        for row in self.rows.iter().filter(|r| keep(r)) {
            matched += 1;
            for (total, value) in totals.iter_mut().zip(&row.values) {
                *total += value;
            }
        }
        let by_date = self.dates.iter().copied().zip(totals).collect();
        (by_date, matched)
    }
}

/// Column positions resolved from the header row.
struct HeaderLayout {
    country_idx: usize,
    province_idx: Option<usize>,
    /// `(column index, date)` for every date column, in file order.
    date_columns: Vec<(usize, NaiveDate)>,
    dates: Vec<NaiveDate>,
}

impl HeaderLayout {
    fn resolve(headers: &StringRecord, source: &str) -> Result<Self, DataError> {
        let header_map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header_name(name), idx))
            .collect();

        let country_idx = COUNTRY_HEADERS
            .iter()
            .find_map(|h| header_map.get(*h).copied())
            .ok_or_else(|| DataError::MissingCountryColumn {
                file: source.to_string(),
            })?;
        let province_idx = PROVINCE_HEADERS
            .iter()
            .find_map(|h| header_map.get(*h).copied());

        let mut date_columns = Vec::new();
        for (idx, name) in headers.iter().enumerate() {
            let name = name.trim();
            if !DATE_HEADER.is_match(name) {
                continue;
            }
            let date = parse_date_header(name).ok_or_else(|| DataError::MalformedDate {
                file: source.to_string(),
                column: name.to_string(),
            })?;
            date_columns.push((idx, date));
        }
        let dates = date_columns.iter().map(|(_, d)| *d).collect();

        Ok(Self {
            country_idx,
            province_idx,
            date_columns,
            dates,
        })
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        headers: &StringRecord,
        source: &str,
        line: usize,
    ) -> Result<RegionRow, DataError> {
        let country = record.get(self.country_idx).unwrap_or("").to_string();
        let province = self
            .province_idx
            .and_then(|idx| record.get(idx))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mut values = Vec::with_capacity(self.date_columns.len());
        for &(idx, _) in &self.date_columns {
            let raw = record.get(idx).unwrap_or("");
            let value = parse_count(raw).ok_or_else(|| DataError::MalformedValue {
                file: source.to_string(),
                line,
                column: headers.get(idx).unwrap_or("").to_string(),
                value: raw.to_string(),
            })?;
            values.push(value);
        }

        Ok(RegionRow {
            country,
            province,
            values,
        })
    }
}

/// Parse a `M/D/YY` column header.
pub fn parse_date_header(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%m/%d/%y").ok()
}

fn normalize_header_name(name: &str) -> String {
    // Strip a UTF-8 BOM on the first header, otherwise the lookup misses it.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Counts are integers; a few CSSE snapshots carry `.0` floats or blanks.
fn parse_count(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v.round() as i64)
    } else {
        None
    }
}

fn csv_error(source: &str, err: csv::Error) -> DataError {
    DataError::Csv {
        file: source.to_string(),
        source: err,
    }
}
