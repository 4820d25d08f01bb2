//! Plotters-powered stacked-area chart widget for Ratatui.
//!
//! The drawing itself is `plot::render::draw_panel`, the same code that writes
//! SVG files; we only hand it a terminal-sized style and render the Plotters
//! output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::pipeline::CountryView;
use crate::plot::{column_color, draw_panel, PanelStyle};

/// Render-only chart for one country view.
pub struct CountryChart<'a> {
    pub view: &'a CountryView,
}

impl<'a> Widget for CountryChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let view = self.view;
        let style = PanelStyle::terminal();
        let widget = widget_fn(move |root| {
            draw_panel(&root, view, &style)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Colored legend line matching the chart palette.
pub fn legend_line(view: &CountryView) -> Line<'static> {
    let mut spans = Vec::new();
    for column in &view.columns {
        let c = column_color(*column);
        spans.push(Span::styled("██ ", Style::default().fg(Color::Rgb(c.0, c.1, c.2))));
        spans.push(Span::raw(format!("{}  ", column.label())));
    }
    if view.projection.is_some() {
        spans.push(Span::styled("── ", Style::default().fg(Color::White)));
        spans.push(Span::raw("projected infected"));
    }
    Line::from(spans)
}
