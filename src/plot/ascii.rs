//! ASCII stacked-area preview for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - bands: `#` infected, `x` deaths, `o` recovered, `.` probably recovered
//! - regression overlay: `*`

use chrono::NaiveDate;

use super::{stack_bands, value_range};
use crate::app::pipeline::CountryView;
use crate::domain::ChartColumn;

fn band_char(column: ChartColumn) -> char {
    match column {
        ChartColumn::Infected => '#',
        ChartColumn::Deaths => 'x',
        ChartColumn::Recovered => 'o',
        ChartColumn::ProbablyRecovered => '.',
    }
}

/// Render the visible window of `view` as a `width` × `height` character chart
/// with a title line above and a date/legend line below.
pub fn render_ascii_chart(view: &CountryView, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let visible = view.visible();
    let mut out = String::new();
    out.push_str(&view.title());
    out.push('\n');
    if visible.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let bands = stack_bands(visible, &view.columns);
    let overlay: Vec<(NaiveDate, f64)> = view
        .projection
        .as_ref()
        .map(|p| {
            p.points
                .iter()
                .filter(|(d, _)| *d >= visible[0].date)
                .copied()
                .collect()
        })
        .unwrap_or_default();
    let (y_min, y_max) = value_range(&bands, overlay.iter().map(|(_, v)| v));

    let mut grid = vec![vec![' '; width]; height];
    for x in 0..width {
        let idx = map_index(x, width, visible.len());
        for band in &bands {
            let lo = band.lower[idx];
            let hi = band.upper[idx];
            if hi <= lo {
                continue;
            }
            let top = map_y(hi, y_min, y_max, height);
            let bottom = map_y(lo, y_min, y_max, height);
            let ch = band_char(band.column);
            for row in grid.iter_mut().take(bottom + 1).skip(top) {
                row[x] = ch;
            }
        }
    }

    for (date, value) in &overlay {
        let Some(idx) = visible.iter().position(|r| r.date == *date) else {
            continue;
        };
        let x = map_x(idx, visible.len(), width);
        let y = map_y(*value, y_min, y_max, height);
        grid[y][x] = '*';
    }

    out.push_str(&format!("y=[{y_min:.0}, {y_max:.0}]\n"));
    for row in grid {
        out.push('|');
        out.extend(row);
        out.push('\n');
    }

    let first = visible[0].date;
    let last = visible[visible.len() - 1].date;
    let legend: Vec<String> = view
        .columns
        .iter()
        .map(|c| format!("{} {}", band_char(*c), c.label()))
        .chain(overlay.first().map(|_| "* projected infected".to_string()))
        .collect();
    out.push_str(&format!("{first} .. {last} | {}", legend.join("  ")));
    out
}

/// Record index shown in grid column `x`.
fn map_index(x: usize, width: usize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = x as f64 / (width - 1) as f64;
    ((n - 1) as f64 * u).round() as usize
}

/// Grid column of record index `idx`.
fn map_x(idx: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = idx as f64 / (n - 1) as f64;
    ((width - 1) as f64 * u).round() as usize
}

fn map_y(value: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((value - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    (height - 1) - ((height - 1) as f64 * u).round() as usize
}
