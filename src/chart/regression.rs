//! Peer-country regression overlay.
//!
//! Approximates a target country's `infected` series as a weighted sum of
//! peer countries' `infected` series plus the target's own series lagged by
//! `self_lag_days` (an autoregressive term):
//!
//! ```text
//! infected[t] ≈ Σ_p β_p · peer_p[t] + β_self · infected[t - self_lag]
//! ```
//!
//! No intercept. Peers are aligned to the target by date; days missing from
//! any peer drop out of both the fit and the projection. The fit uses days from
//! `max(cutoff, self_lag_days)` onwards so every row has a defined self term.

use std::collections::HashMap;

use chrono::NaiveDate;
use nalgebra::DVector;
use serde::Serialize;

use crate::domain::CountryDailySeries;
use crate::error::AppError;
use crate::math::{design_matrix, solve_least_squares};

/// One fitted coefficient and the series it weights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionTerm {
    pub label: String,
    pub coefficient: f64,
}

/// Fitted overlay for one target series.
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub target: String,
    pub terms: Vec<RegressionTerm>,
    /// Projected infected per date, on the target's date axis.
    pub points: Vec<(NaiveDate, f64)>,
    /// Number of days used in the fit.
    pub rows: usize,
}

impl Projection {
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.points.iter().find(|(d, _)| *d == date).map(|(_, v)| *v)
    }
}

/// Fit the overlay; `Ok(None)` when no peers are given.
///
/// Both `target` and `peers` are expected to be lag-adjusted already.
pub fn compute_regression_projection(
    target: &CountryDailySeries,
    peers: &[CountryDailySeries],
    self_lag_days: usize,
    cutoff: usize,
) -> Result<Option<Projection>, AppError> {
    if peers.is_empty() {
        return Ok(None);
    }

    let peer_maps: Vec<HashMap<NaiveDate, f64>> = peers
        .iter()
        .map(|p| p.records.iter().map(|r| (r.date, r.infected as f64)).collect())
        .collect();

    let mut labels: Vec<String> = peers.iter().map(|p| p.label.clone()).collect();
    if self_lag_days > 0 {
        labels.push(format!("{} (t-{self_lag_days}d)", target.label));
    }

    // Feature row for target index `t`, if every feature is defined there.
    let features_at = |t: usize| -> Option<Vec<f64>> {
        let date = target.records[t].date;
        let mut row = Vec::with_capacity(labels.len());
        for map in &peer_maps {
            row.push(*map.get(&date)?);
        }
        if self_lag_days > 0 {
            let lagged = t.checked_sub(self_lag_days)?;
            row.push(target.records[lagged].infected as f64);
        }
        Some(row)
    };

    let fit_start = cutoff.max(self_lag_days);
    let mut columns = vec![Vec::new(); labels.len()];
    let mut y = Vec::new();
    for t in fit_start..target.len() {
        let Some(row) = features_at(t) else { continue };
        for (col, value) in columns.iter_mut().zip(row) {
            col.push(value);
        }
        y.push(target.records[t].infected as f64);
    }

    if y.len() < labels.len() {
        return Err(AppError::new(
            3,
            format!(
                "Not enough overlapping days to fit {} against {} series ({} days).",
                target.label,
                labels.len(),
                y.len()
            ),
        ));
    }

    let x = design_matrix(&columns)
        .ok_or_else(|| AppError::new(3, "Inconsistent regression feature lengths."))?;
    let rows = y.len();
    let beta = solve_least_squares(&x, &DVector::from_vec(y)).ok_or_else(|| {
        AppError::new(
            3,
            format!("Regression for {} is too ill-conditioned to solve.", target.label),
        )
    })?;

    let points: Vec<(NaiveDate, f64)> = (0..target.len())
        .filter_map(|t| {
            let row = features_at(t)?;
            let value: f64 = row.iter().zip(beta.iter()).map(|(x, b)| x * b).sum();
            Some((target.records[t].date, value))
        })
        .collect();

    let terms = labels
        .into_iter()
        .zip(beta.iter())
        .map(|(label, &coefficient)| RegressionTerm { label, coefficient })
        .collect();

    Ok(Some(Projection {
        target: target.label.clone(),
        terms,
        points,
        rows,
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::DailyRecord;

    fn infected_series(label: &str, start_offset: i64, infected: &[i64]) -> CountryDailySeries {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap() + Duration::days(start_offset);
        CountryDailySeries {
            label: label.to_string(),
            records: infected
                .iter()
                .enumerate()
                .map(|(i, v)| DailyRecord::raw(start + Duration::days(i as i64), *v, 0, 0))
                .collect(),
            unavailable: Vec::new(),
        }
    }

    #[test]
    fn no_peers_means_no_projection() {
        let target = infected_series("Target", 0, &[1, 2, 3]);
        assert!(compute_regression_projection(&target, &[], 14, 0).unwrap().is_none());
    }

    #[test]
    fn projection_is_the_fitted_combination() {
        let a: Vec<i64> = (0..40).map(|t| 10 + 3 * t).collect();
        let b: Vec<i64> = (0..40).map(|t| (t * t) % 17 + 5).collect();
        let target: Vec<i64> = (0..40).map(|t| (t * 31) % 23 + 2 * t).collect();
        let target_series = infected_series("Target", 0, &target);
        let peers = [infected_series("A", 0, &a), infected_series("B", 0, &b)];

        let projection = compute_regression_projection(&target_series, &peers, 0, 0)
            .unwrap()
            .unwrap();
        assert_eq!(projection.terms.len(), 2);
        assert_eq!(projection.terms[0].label, "A");
        assert_eq!(projection.rows, 40);
        assert_eq!(projection.points.len(), 40);

        let date = target_series.records[7].date;
        let expected = projection.terms[0].coefficient * a[7] as f64
            + projection.terms[1].coefficient * b[7] as f64;
        assert!((projection.value_on(date).unwrap() - expected).abs() < 1e-6);
    }

    #[test]
    fn exact_linear_target_is_reproduced() {
        let a: Vec<i64> = (0..30).map(|t| 100 + 7 * t).collect();
        let b: Vec<i64> = (0..30).map(|t| (t * 13) % 11).collect();
        let target: Vec<i64> = a.iter().zip(&b).map(|(a, b)| 2 * a + 5 * b).collect();

        let projection = compute_regression_projection(
            &infected_series("Target", 0, &target),
            &[infected_series("A", 0, &a), infected_series("B", 0, &b)],
            0,
            5,
        )
        .unwrap()
        .unwrap();

        assert!((projection.terms[0].coefficient - 2.0).abs() < 1e-8);
        assert!((projection.terms[1].coefficient - 5.0).abs() < 1e-8);
        // Fit rows start at the cutoff; projection covers every aligned day.
        assert_eq!(projection.rows, 25);
        assert_eq!(projection.points.len(), 30);
    }

    #[test]
    fn self_lag_term_is_labelled_and_skips_early_days() {
        let a: Vec<i64> = (0..30).map(|t| 50 + t * t).collect();
        let target: Vec<i64> = (0..30).map(|t| 3 * t + 1).collect();

        let projection = compute_regression_projection(
            &infected_series("Target", 0, &target),
            &[infected_series("A", 0, &a)],
            14,
            0,
        )
        .unwrap()
        .unwrap();

        assert_eq!(projection.terms[1].label, "Target (t-14d)");
        assert_eq!(projection.rows, 16);
        assert_eq!(projection.points.len(), 16);
        assert_eq!(projection.points[0].0, NaiveDate::from_ymd_opt(2020, 3, 15).unwrap());
    }

    #[test]
    fn peers_align_by_date() {
        // Peer starts 5 days later: only the overlap is usable.
        let a: Vec<i64> = (0..20).map(|t| 10 + 2 * t).collect();
        let target: Vec<i64> = (0..25).map(|t| 4 * t).collect();

        let projection = compute_regression_projection(
            &infected_series("Target", 0, &target),
            &[infected_series("A", 5, &a)],
            0,
            0,
        )
        .unwrap()
        .unwrap();
        assert_eq!(projection.rows, 20);
        assert_eq!(projection.points[0].0, NaiveDate::from_ymd_opt(2020, 3, 6).unwrap());
    }

    #[test]
    fn too_few_days_is_an_error() {
        let err = compute_regression_projection(
            &infected_series("Target", 0, &[1, 2, 3]),
            &[infected_series("A", 0, &[1, 2, 3])],
            14,
            0,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
