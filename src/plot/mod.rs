//! Chart rendering.
//!
//! - `render`: Plotters stacked-area panels (SVG files, reused by the TUI widget)
//! - `ascii`: fixed-size terminal preview
//!
//! Both draw the same stacked bands, computed once by `stack_bands`.

pub mod ascii;
pub mod render;

pub use ascii::*;
pub use render::*;

use plotters::style::RGBColor;

use crate::domain::{ChartColumn, DailyRecord};

/// Fixed palette, one color per column in `ChartColumn::ALL` order.
pub const PALETTE: [RGBColor; 4] = [
    RGBColor(31, 119, 180),  // infected: blue
    RGBColor(255, 127, 14),  // deaths: orange
    RGBColor(44, 160, 44),   // recovered: green
    RGBColor(214, 39, 40),   // probably recovered: red
];

pub fn column_color(column: ChartColumn) -> RGBColor {
    let idx = ChartColumn::ALL
        .iter()
        .position(|c| *c == column)
        .unwrap_or(0);
    PALETTE[idx]
}

/// One stacked band: `lower[i]..upper[i]` for every visible record.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub column: ChartColumn,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Stack `columns` bottom-up in the given order.
pub fn stack_bands(records: &[DailyRecord], columns: &[ChartColumn]) -> Vec<Band> {
    let mut base = vec![0.0f64; records.len()];
    let mut bands = Vec::with_capacity(columns.len());
    for &column in columns {
        let upper: Vec<f64> = records
            .iter()
            .zip(&base)
            .map(|(r, b)| b + column.value(r) as f64)
            .collect();
        bands.push(Band {
            column,
            lower: base,
            upper: upper.clone(),
        });
        base = upper;
    }
    bands
}

/// `(min, max)` across all band edges and extra values, always containing 0.
pub fn value_range<'a>(bands: &'a [Band], extra: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let mut y_min = 0.0f64;
    let mut y_max = 0.0f64;
    let edges = bands
        .iter()
        .flat_map(|b| b.lower.iter().chain(b.upper.iter()))
        .chain(extra);
    for &v in edges {
        if v.is_finite() {
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }
    }
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }
    (y_min, y_max)
}
