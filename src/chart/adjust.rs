//! Recovery-lag correction.
//!
//! CSSE "recovered" counts trail reality by weeks. Assuming a fixed disease
//! duration of `lag` days, everyone confirmed `lag` days ago who has not died
//! should have recovered by now:
//!
//! ```text
//! probably_recovered[t] = max(confirmed[t - lag] - deaths[t], recovered[t]) - recovered[t]
//! infected[t]           = confirmed[t] - recovered[t] - deaths[t] - probably_recovered[t]
//! ```
//!
//! `confirmed[t - lag]` is 0 before the start of the series. Neither column
//! is clamped: noisy upstream corrections can push `infected` below zero.

use crate::domain::{CountryDailySeries, RecoveryLag};

/// Return a copy of `series` with `probably_recovered` and `infected` recomputed.
pub fn derive_adjusted_series(series: &CountryDailySeries, lag: RecoveryLag) -> CountryDailySeries {
    let mut out = series.clone();

    for t in 0..out.records.len() {
        let probably_recovered = match lag.days() {
            None => 0,
            Some(days) => {
                let shifted_confirmed = t
                    .checked_sub(days)
                    .map(|s| series.records[s].confirmed)
                    .unwrap_or(0);
                let rec = &series.records[t];
                (shifted_confirmed - rec.deaths).max(rec.recovered) - rec.recovered
            }
        };

        let rec = &mut out.records[t];
        rec.probably_recovered = probably_recovered;
        rec.infected = rec.confirmed - rec.recovered - rec.deaths - probably_recovered;
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::domain::DailyRecord;

    fn series(confirmed: &[i64], deaths: &[i64], recovered: &[i64]) -> CountryDailySeries {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let records = confirmed
            .iter()
            .zip(deaths)
            .zip(recovered)
            .enumerate()
            .map(|(i, ((c, d), r))| DailyRecord::raw(start + Duration::days(i as i64), *c, *d, *r))
            .collect();
        CountryDailySeries {
            label: "Testland".to_string(),
            records,
            unavailable: Vec::new(),
        }
    }

    #[test]
    fn disabled_lag_is_plain_difference() {
        let raw = series(&[10, 20, 40], &[1, 2, 3], &[0, 5, 10]);
        let adjusted = derive_adjusted_series(&raw, RecoveryLag::Disabled);

        for (a, r) in adjusted.records.iter().zip(&raw.records) {
            assert_eq!(a.probably_recovered, 0);
            assert_eq!(a.infected, r.confirmed - r.deaths - r.recovered);
        }
    }

    #[test]
    fn one_week_lag_reclassifies_stale_cases() {
        // 14 days: confirmed ramps for a week then holds at 700.
        let confirmed: Vec<i64> = (0..14).map(|t| if t < 7 { 100 * (t + 1) } else { 700 }).collect();
        let deaths = vec![0; 14];
        let recovered = vec![50; 14];
        let raw = series(&confirmed, &deaths, &recovered);

        let adjusted = derive_adjusted_series(&raw, RecoveryLag::Weeks(1));
        for t in 0..14 {
            let expected = if t >= 7 { (confirmed[t - 7] - deaths[t]) - recovered[t] } else { 0 };
            assert_eq!(adjusted.records[t].probably_recovered, expected, "t={t}");
            assert_eq!(
                adjusted.records[t].infected,
                confirmed[t] - recovered[t] - deaths[t] - expected
            );
        }
        // Fully lagged out: only the last week's new cases stay active.
        assert_eq!(adjusted.records[13].infected, 0);
    }

    #[test]
    fn deaths_before_first_lagged_day_leave_nothing_reclassified() {
        // Before day 7 the shifted confirmed is 0, so the term is max(-deaths, R) - R.
        let confirmed = vec![100; 10];
        let deaths = vec![4; 10];
        let recovered = vec![5; 10];
        let raw = series(&confirmed, &deaths, &recovered);

        let adjusted = derive_adjusted_series(&raw, RecoveryLag::Weeks(1));
        for t in 0..7 {
            assert_eq!(adjusted.records[t].probably_recovered, (-4i64).max(5) - 5, "t={t}");
            assert_eq!(adjusted.records[t].probably_recovered, 0);
            assert_eq!(adjusted.records[t].infected, 100 - 4 - 5);
        }
        // From day 7 on, the stale confirmed minus deaths exceeds R.
        assert_eq!(adjusted.records[7].probably_recovered, (100 - 4) - 5);
    }

    #[test]
    fn input_series_is_untouched() {
        let raw = series(&[10, 20, 40], &[0, 0, 0], &[0, 0, 0]);
        let before = raw.clone();
        let _ = derive_adjusted_series(&raw, RecoveryLag::Weeks(0));
        assert_eq!(raw, before);
    }
}
