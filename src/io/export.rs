//! Export derived series to CSV or JSON.
//!
//! CSV is one row per date (easy to consume in spreadsheets); JSON carries
//! the whole view including the fitted regression terms.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::pipeline::CountryView;
use crate::chart::RegressionTerm;
use crate::domain::{DailyRecord, Metric};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    country: &'a str,
    date: NaiveDate,
    confirmed: i64,
    deaths: i64,
    recovered: i64,
    probably_recovered: i64,
    infected: i64,
    projected_infected: Option<f64>,
}

#[derive(Debug, Serialize)]
struct JsonView<'a> {
    tool: &'static str,
    country: &'a str,
    recovery_lag: String,
    window: String,
    display_start: NaiveDate,
    unavailable: &'a [Metric],
    regression: Option<&'a [RegressionTerm]>,
    records: &'a [DailyRecord],
    projected_infected: Option<&'a [(NaiveDate, f64)]>,
}

/// Write views to `path`; `.csv` selects CSV, anything else JSON.
pub fn write_views(path: &Path, views: &[CountryView]) -> Result<(), AppError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        == Some(true);
    if is_csv {
        write_views_csv(path, views)
    } else {
        write_views_json(path, views)
    }
}

pub fn write_views_csv(path: &Path, views: &[CountryView]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for view in views {
        for r in &view.series.records {
            let projected_infected = view.projection.as_ref().and_then(|p| p.value_on(r.date));
            writer
                .serialize(CsvRow {
                    country: &view.series.label,
                    date: r.date,
                    confirmed: r.confirmed,
                    deaths: r.deaths,
                    recovered: r.recovered,
                    probably_recovered: r.probably_recovered,
                    infected: r.infected,
                    projected_infected,
                })
                .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))
}

pub fn write_views_json(path: &Path, views: &[CountryView]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let docs: Vec<JsonView<'_>> = views
        .iter()
        .map(|v| JsonView {
            tool: "covid",
            country: &v.series.label,
            recovery_lag: v.lag.to_string(),
            window: v.window.to_string(),
            display_start: v.series.records[v.cutoff].date,
            unavailable: &v.series.unavailable,
            regression: v.projection.as_ref().map(|p| p.terms.as_slice()),
            records: &v.series.records,
            projected_infected: v.projection.as_ref().map(|p| p.points.as_slice()),
        })
        .collect();

    serde_json::to_writer_pretty(file, &docs)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::{ChartColumn, CountryDailySeries, DisplayWindow, RecoveryLag};

    fn view() -> CountryView {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        CountryView {
            series: CountryDailySeries {
                label: "Korea, South".to_string(),
                records: (0..3)
                    .map(|t| DailyRecord::raw(start + Duration::days(t), 10 * t, t, 2 * t))
                    .collect(),
                unavailable: Vec::new(),
            },
            cutoff: 1,
            columns: ChartColumn::ALL.to_vec(),
            window: DisplayWindow::PeakFraction,
            lag: RecoveryLag::Disabled,
            deaths_only: false,
            projection: None,
        }
    }

    #[test]
    fn csv_export_quotes_country_and_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_views(&path, &[view()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "country,date,confirmed,deaths,recovered,probably_recovered,infected,projected_infected"
        );
        assert_eq!(lines[3], "\"Korea, South\",2020-03-03,20,2,4,0,14,");
    }

    #[test]
    fn json_export_carries_window_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_views(&path, &[view()]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["country"], "Korea, South");
        assert_eq!(value[0]["display_start"], "2020-03-02");
        assert_eq!(value[0]["records"].as_array().unwrap().len(), 3);
        assert!(value[0]["regression"].is_null());
    }
}
