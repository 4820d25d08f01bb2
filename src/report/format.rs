//! Formatted terminal output.
//!
//! We keep formatting code in one place so the chart/regression code stays
//! free of presentation concerns.

use std::collections::BTreeSet;

use crate::app::pipeline::CountryView;
use crate::chart::Projection;
use crate::domain::RegionScope;

/// One name per line, followed by the count.
pub fn format_country_list(names: &BTreeSet<String>, scope: RegionScope) -> String {
    let mut out = String::new();
    for name in names {
        out.push_str(name);
        out.push('\n');
    }
    let noun = match scope {
        RegionScope::Global => "countries/regions",
        RegionScope::Us => "US states/territories",
    };
    out.push_str(&format!("({} {noun})", names.len()));
    out
}

/// Human-readable fitted formula, e.g.
/// `Germany infected ≈ 0.8123 × Italy + 1.0410 × Germany (t-14d)`.
pub fn format_projection_formula(projection: &Projection) -> String {
    let mut out = format!("{} infected ≈", projection.target);
    for (i, term) in projection.terms.iter().enumerate() {
        let coef = term.coefficient;
        if i == 0 {
            out.push_str(&format!(" {coef:.4} × {}", term.label));
        } else if coef < 0.0 {
            out.push_str(&format!(" - {:.4} × {}", -coef, term.label));
        } else {
            out.push_str(&format!(" + {coef:.4} × {}", term.label));
        }
    }
    out.push_str(&format!("  (fit on {} days)", projection.rows));
    out
}

/// Short per-view summary printed after rendering.
pub fn format_view_summary(view: &CountryView) -> String {
    let mut out = String::new();
    let Some(last) = view.series.records.last() else {
        return format!("{}: no data", view.series.label);
    };

    out.push_str(&format!("=== {} ({}) ===\n", view.series.label, last.date));
    out.push_str(&format!(
        "confirmed={} | deaths={} | recovered={} | probably recovered={} | infected={}\n",
        last.confirmed, last.deaths, last.recovered, last.probably_recovered, last.infected
    ));
    out.push_str(&format!(
        "window: {} (from {}) | recovery lag: {}",
        view.window,
        view.series.records[view.cutoff].date,
        view.lag
    ));
    if !view.series.unavailable.is_empty() {
        let names: Vec<&str> = view
            .series
            .unavailable
            .iter()
            .map(|m| m.file_key())
            .collect();
        out.push_str(&format!("\nunavailable: {}", names.join(", ")));
    }
    if let Some(projection) = &view.projection {
        out.push('\n');
        out.push_str(&format_projection_formula(projection));
    }
    out
}
