//! Shared "chart pipeline" logic used by the CLI, export, and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! repository query -> lag correction -> display window -> regression overlay
//!
//! The front-ends can then focus on presentation (SVG, ASCII, widgets, files).

use rayon::prelude::*;
use tracing::{info, warn};

use crate::chart::{
    compute_display_window, compute_regression_projection, derive_adjusted_series, Projection,
};
use crate::data::TimeSeriesRepository;
use crate::domain::{
    ChartColumn, ChartRequest, CountryDailySeries, DailyRecord, DisplayWindow, RecoveryLag,
};
use crate::error::AppError;

/// Everything needed to draw one chart panel.
#[derive(Debug, Clone)]
pub struct CountryView {
    /// Lag-adjusted series (full history; `cutoff` marks the visible start).
    pub series: CountryDailySeries,
    pub cutoff: usize,
    pub columns: Vec<ChartColumn>,
    pub window: DisplayWindow,
    pub lag: RecoveryLag,
    pub deaths_only: bool,
    pub projection: Option<Projection>,
}

impl CountryView {
    /// Records inside the display window.
    pub fn visible(&self) -> &[DailyRecord] {
        &self.series.records[self.cutoff..]
    }

    /// Chart title: subject, label and most recent date.
    pub fn title(&self) -> String {
        let subject = if self.deaths_only { "deaths" } else { "infections" };
        match self.series.last_date() {
            Some(date) => format!("Covid19 {subject} for {} ({date})", self.series.label),
            None => format!("Covid19 {subject} for {}", self.series.label),
        }
    }
}

/// Build the view for one panel: `names` are summed into a single series.
pub fn build_country_view<S: AsRef<str>>(
    repo: &TimeSeriesRepository,
    names: &[S],
    request: &ChartRequest,
) -> Result<CountryView, AppError> {
    let raw = repo.data_for_scope(request.scope, names);
    if raw.is_empty() {
        return Err(AppError::new(
            2,
            format!("No dates available for {}.", raw.label),
        ));
    }

    let series = derive_adjusted_series(&raw, request.lag);
    let cutoff = compute_display_window(&series, request.window).min(series.len() - 1);

    let peers: Vec<CountryDailySeries> = request
        .peers
        .iter()
        .map(|p| derive_adjusted_series(&repo.data_for_scope(request.scope, &[p]), request.lag))
        .collect();

    let projection =
        match compute_regression_projection(&series, &peers, request.self_lag_days, cutoff) {
            Ok(projection) => projection,
            Err(err) => {
                warn!("Skipping regression overlay for {}: {err}", series.label);
                None
            }
        };
    if let Some(projection) = &projection {
        info!("{}", crate::report::format_projection_formula(projection));
    }

    Ok(CountryView {
        series,
        cutoff,
        columns: ChartColumn::selection(request.deaths_only, request.lag),
        window: request.window,
        lag: request.lag,
        deaths_only: request.deaths_only,
        projection,
    })
}

/// Build every panel of a request.
///
/// One panel per country, or a single summed panel with `combine`. Panels are
/// independent queries against the repository, so they are built in parallel.
pub fn build_country_views(
    repo: &TimeSeriesRepository,
    request: &ChartRequest,
) -> Result<Vec<CountryView>, AppError> {
    if request.countries.is_empty() {
        return Err(AppError::new(2, "No countries given."));
    }

    if request.combine {
        return Ok(vec![build_country_view(repo, request.countries.as_slice(), request)?]);
    }

    request
        .countries
        .par_iter()
        .map(|country| build_country_view(repo, std::slice::from_ref(country), request))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Metric, RegionScope};
    use crate::io::table::RegionMetricTable;

    fn repo() -> TimeSeriesRepository {
        let mut header = String::from("Province/State,Country/Region,Lat,Long");
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        for i in 0..60 {
            let d = start + chrono::Duration::days(i);
            header.push_str(&format!(",{}", d.format("%-m/%-d/%y")));
        }
        let row = |name: &str, f: &dyn Fn(i64) -> i64| {
            let values: Vec<String> = (0..60).map(|t| f(t).to_string()).collect();
            format!(",{name},0,0,{}", values.join(","))
        };
        let confirmed = format!(
            "{header}\n{}\n{}\n",
            row("Germany", &|t| 10 * t * t),
            row("Italy", &|t| 12 * t * t + 5 * t)
        );
        let deaths = format!(
            "{header}\n{}\n{}\n",
            row("Germany", &|t| t),
            row("Italy", &|t| 2 * t)
        );
        let recovered = format!(
            "{header}\n{}\n{}\n",
            row("Germany", &|t| 3 * t),
            row("Italy", &|t| 4 * t)
        );
        let tables = [
            (Metric::Confirmed, confirmed),
            (Metric::Deaths, deaths),
            (Metric::Recovered, recovered),
        ]
        .into_iter()
        .map(|(metric, body)| {
            RegionMetricTable::from_reader(body.as_bytes(), "fixture", RegionScope::Global, metric)
                .unwrap()
        })
        .collect();
        TimeSeriesRepository::from_tables(tables)
    }

    #[test]
    fn view_applies_lag_window_and_columns() {
        let repo = repo();
        let request = ChartRequest {
            countries: vec!["Germany".to_string()],
            lag: RecoveryLag::Weeks(2),
            window: DisplayWindow::LastWeeks(4),
            ..ChartRequest::default()
        };
        let view = build_country_view(&repo, request.countries.as_slice(), &request).unwrap();

        assert_eq!(view.cutoff, 60 - 28);
        assert_eq!(view.visible().len(), 28);
        assert_eq!(view.columns.len(), 4);
        assert!(view.series.records[30].probably_recovered > 0);
        assert!(view.projection.is_none());
        assert_eq!(view.title(), "Covid19 infections for Germany (2020-04-29)");
    }

    #[test]
    fn peers_add_projection() {
        let repo = repo();
        let request = ChartRequest {
            countries: vec!["Germany".to_string()],
            peers: vec!["Italy".to_string()],
            ..ChartRequest::default()
        };
        let view = build_country_view(&repo, request.countries.as_slice(), &request).unwrap();
        let projection = view.projection.unwrap();
        assert_eq!(projection.terms.len(), 2);
        assert_eq!(projection.terms[1].label, "Germany (t-14d)");
    }

    #[test]
    fn views_per_country_or_combined() {
        let repo = repo();
        let mut request = ChartRequest {
            countries: vec!["Germany".to_string(), "Italy".to_string()],
            deaths_only: true,
            ..ChartRequest::default()
        };
        let views = build_country_views(&repo, &request).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].series.label, "Italy");
        assert_eq!(views[0].columns, vec![ChartColumn::Deaths]);

        request.combine = true;
        let views = build_country_views(&repo, &request).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].series.label, "Germany + Italy");
        assert!(views[0].title().starts_with("Covid19 deaths for Germany + Italy"));
    }

    #[test]
    fn us_scope_charts_states() {
        let us = "\
UID,Admin2,Province_State,Country_Region,3/1/20,3/2/20,3/3/20
1,Autauga,Alabama,US,1,2,3
2,Baldwin,Alabama,US,4,5,6
3,King,Washington,US,7,8,9
";
        let tables = [Metric::Confirmed, Metric::Deaths]
            .into_iter()
            .map(|metric| {
                RegionMetricTable::from_reader(us.as_bytes(), "us", RegionScope::Us, metric).unwrap()
            })
            .collect();
        let repo = TimeSeriesRepository::from_tables(tables);
        let request = ChartRequest {
            countries: vec!["Alabama".to_string()],
            scope: RegionScope::Us,
            ..ChartRequest::default()
        };

        let views = build_country_views(&repo, &request).unwrap();
        assert_eq!(views[0].series.label, "Alabama");
        assert_eq!(views[0].series.confirmed(), vec![5, 7, 9]);
        assert_eq!(views[0].series.unavailable, vec![Metric::Recovered]);
    }

    #[test]
    fn empty_request_is_rejected() {
        let err = build_country_views(&repo(), &ChartRequest::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
