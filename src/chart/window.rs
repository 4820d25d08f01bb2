//! Left edge of the chart's date axis.

use crate::domain::{CountryDailySeries, DisplayWindow, PEAK_CUTOFF_DIVISOR};

/// Index of the first record shown in a chart.
///
/// - `PeakFraction`: first index with `confirmed > max(confirmed) / 100`,
///   which trims the long near-zero tail before an outbreak. A series that
///   never rises above zero starts at 0.
/// - `LastWeeks(n)`: the trailing `n * 7` records (clamped to the series start);
///   `LastWeeks(0)` shows the whole series.
///
/// The result is always a valid index for a non-empty series.
pub fn compute_display_window(series: &CountryDailySeries, window: DisplayWindow) -> usize {
    match window {
        DisplayWindow::LastWeeks(0) => 0,
        DisplayWindow::LastWeeks(weeks) => series.len().saturating_sub(weeks as usize * 7),
        DisplayWindow::PeakFraction => {
            let peak = series.records.iter().map(|r| r.confirmed).max().unwrap_or(0);
            let cutoff = peak as f64 / PEAK_CUTOFF_DIVISOR;
            series
                .records
                .iter()
                .position(|r| r.confirmed as f64 > cutoff)
                .unwrap_or(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::domain::DailyRecord;

    fn confirmed_only(values: &[i64]) -> CountryDailySeries {
        let start = NaiveDate::from_ymd_opt(2020, 2, 1).unwrap();
        CountryDailySeries {
            label: "Testland".to_string(),
            records: values
                .iter()
                .enumerate()
                .map(|(i, c)| DailyRecord::raw(start + Duration::days(i as i64), *c, 0, 0))
                .collect(),
            unavailable: Vec::new(),
        }
    }

    #[test]
    fn peak_fraction_skips_leading_tail() {
        // max/100 = 1.0, so the first value strictly above it is 2 at index 3.
        let series = confirmed_only(&[0, 0, 1, 2, 50, 100]);
        assert_eq!(compute_display_window(&series, DisplayWindow::PeakFraction), 3);
    }

    #[test]
    fn all_zero_series_starts_at_zero() {
        let series = confirmed_only(&[0, 0, 0]);
        assert_eq!(compute_display_window(&series, DisplayWindow::PeakFraction), 0);
        assert_eq!(compute_display_window(&confirmed_only(&[]), DisplayWindow::PeakFraction), 0);
    }

    #[test]
    fn trailing_weeks_override_peak_cutoff() {
        let series = confirmed_only(&vec![5; 30]);
        assert_eq!(compute_display_window(&series, DisplayWindow::LastWeeks(2)), 16);
        assert_eq!(compute_display_window(&series, DisplayWindow::LastWeeks(10)), 0);
        assert_eq!(compute_display_window(&series, DisplayWindow::LastWeeks(0)), 0);
    }
}
