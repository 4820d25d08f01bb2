//! Plotters stacked-area panels.
//!
//! `draw_panel` is backend-agnostic so the same drawing code produces SVG
//! files and the TUI chart (via `plotters-ratatui-backend`).
//!
//! The x axis is "days since the first visible date", with bold key points on
//! the first of each month and light points on every day.

use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{column_color, stack_bands, value_range};
use crate::app::pipeline::CountryView;
use crate::error::AppError;

/// Visual knobs that differ between SVG files and the terminal.
#[derive(Debug, Clone, Copy)]
pub struct PanelStyle {
    /// Caption font size; 0 disables the caption.
    pub caption_size: u32,
    pub label_size: u32,
    pub margin: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
    pub fg: RGBColor,
    pub bg: RGBColor,
    pub legend: bool,
}

impl PanelStyle {
    pub fn svg() -> Self {
        Self {
            caption_size: 16,
            label_size: 11,
            margin: 8,
            x_label_area: 28,
            y_label_area: 56,
            fg: BLACK,
            bg: WHITE,
            legend: true,
        }
    }

    /// Terminal cells are low-res, so keep label areas compact and leave the
    /// caption/legend to the surrounding widgets.
    pub fn terminal() -> Self {
        Self {
            caption_size: 0,
            label_size: 10,
            margin: 1,
            x_label_area: 3,
            y_label_area: 8,
            fg: WHITE,
            bg: BLACK,
            legend: false,
        }
    }
}

/// Default pixel size of one SVG panel.
pub const DEFAULT_PANEL_SIZE: (u32, u32) = (500, 300);

/// Rows and columns of a grid holding `n` panels.
pub fn grid_shape(n: usize, columns: usize) -> (usize, usize) {
    let columns = columns.clamp(1, n.max(1));
    let rows = n.div_ceil(columns).max(1);
    (rows, columns)
}

/// Grid slot of panel `i`: panels fill the grid column by column.
pub fn panel_slot(i: usize, rows: usize) -> (usize, usize) {
    (i % rows, i / rows)
}

/// Draw one stacked-area panel into `area`.
pub fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    view: &CountryView,
    style: &PanelStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let visible = view.visible();
    let Some(first) = visible.first() else {
        return Ok(());
    };
    let origin = first.date;
    let x_end = (visible.len() as i32 - 1).max(1);

    let bands = stack_bands(visible, &view.columns);
    let overlay: Vec<(i32, f64)> = view
        .projection
        .as_ref()
        .map(|p| {
            p.points
                .iter()
                .filter(|(d, _)| *d >= origin)
                .map(|(d, v)| ((*d - origin).num_days() as i32, *v))
                .collect()
        })
        .unwrap_or_default();
    let (y_min, y_max) = value_range(&bands, overlay.iter().map(|(_, v)| v));
    let y_max = y_max + (y_max - y_min) * 0.05;

    let x_range = (0..x_end)
        .with_key_points(month_starts(origin, x_end))
        .with_light_points(0..=x_end);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(style.margin)
        .x_label_area_size(style.x_label_area)
        .y_label_area_size(style.y_label_area);
    if style.caption_size > 0 {
        builder.caption(
            view.title(),
            ("sans-serif", style.caption_size).into_font().color(&style.fg),
        );
    }
    let mut chart = builder.build_cartesian_2d(x_range, y_min..y_max)?;

    let x_fmt = |x: &i32| day_label(origin, *x);
    let y_fmt = |y: &f64| format_count(*y);
    chart
        .configure_mesh()
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .y_desc("cases")
        .label_style(("sans-serif", style.label_size).into_font().color(&style.fg))
        .axis_style(&style.fg)
        .bold_line_style(&style.fg.mix(0.25))
        .light_line_style(&style.fg.mix(0.06))
        .draw()?;

    for band in &bands {
        let color = column_color(band.column);
        let mut outline: Vec<(i32, f64)> = band
            .upper
            .iter()
            .enumerate()
            .map(|(i, y)| (i as i32, *y))
            .collect();
        outline.extend(band.lower.iter().enumerate().rev().map(|(i, y)| (i as i32, *y)));

        chart
            .draw_series(std::iter::once(Polygon::new(outline, color.mix(0.85).filled())))?
            .label(band.column.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if !overlay.is_empty() {
        let line = style.fg.stroke_width(2);
        chart
            .draw_series(LineSeries::new(overlay, line))?
            .label("projected infected")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], line));
    }

    if style.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font(("sans-serif", style.label_size).into_font().color(&style.fg))
            .background_style(&style.bg.mix(0.8))
            .border_style(&style.fg)
            .draw()?;
    }

    Ok(())
}

/// Lay `views` out on a grid inside `root`.
pub fn draw_grid<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    views: &[CountryView],
    columns: usize,
    style: &PanelStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&style.bg)?;
    let (rows, cols) = grid_shape(views.len(), columns);
    let areas = root.split_evenly((rows, cols));
    for (i, view) in views.iter().enumerate() {
        let (row, col) = panel_slot(i, rows);
        if let Some(area) = areas.get(row * cols + col) {
            draw_panel(area, view, style)?;
        }
    }
    root.present()
}

/// Render all views as one SVG file.
pub fn render_svg(
    path: &Path,
    views: &[CountryView],
    columns: usize,
    panel_size: (u32, u32),
) -> Result<(), AppError> {
    let size = canvas_size(views.len(), columns, panel_size);
    let root = SVGBackend::new(path, size).into_drawing_area();
    draw_grid(&root, views, columns, &PanelStyle::svg())
        .map_err(|e| AppError::new(4, format!("Failed to render '{}': {e}", path.display())))
}

/// Render all views to an in-memory SVG document.
pub fn render_svg_string(
    views: &[CountryView],
    columns: usize,
    panel_size: (u32, u32),
) -> Result<String, AppError> {
    let size = canvas_size(views.len(), columns, panel_size);
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, size).into_drawing_area();
        draw_grid(&root, views, columns, &PanelStyle::svg())
            .map_err(|e| AppError::new(4, format!("Failed to render SVG: {e}")))?;
    }
    Ok(out)
}

fn canvas_size(n: usize, columns: usize, panel_size: (u32, u32)) -> (u32, u32) {
    let (rows, cols) = grid_shape(n, columns);
    (panel_size.0 * cols as u32, panel_size.1 * rows as u32)
}

/// Offsets (days from `origin`) that fall on the first of a month.
///
/// Short windows without a month boundary fall back to both ends.
fn month_starts(origin: NaiveDate, x_end: i32) -> Vec<i32> {
    let starts: Vec<i32> = (0..=x_end)
        .filter(|x| (origin + Duration::days(*x as i64)).day() == 1)
        .collect();
    if starts.is_empty() {
        vec![0, x_end]
    } else {
        starts
    }
}

fn day_label(origin: NaiveDate, x: i32) -> String {
    let date = origin + Duration::days(x as i64);
    if date.day() == 1 {
        date.format("%b %Y").to_string()
    } else {
        date.format("%b %d").to_string()
    }
}

/// Compact axis labels: `950`, `12.5k`, `3.2M`.
pub fn format_count(v: f64) -> String {
    let a = v.abs();
    if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e4 {
        format!("{:.0}k", v / 1e3)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}
