//! Ratatui-based terminal UI.
//!
//! A country list on the left and the stacked-area chart for the selected
//! country on the right. Chart settings (recovery lag, display window,
//! deaths-only) are adjusted with single keys and apply immediately.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Terminal,
};

use crate::app::pipeline::{build_country_view, CountryView};
use crate::cli::{window_from_weeks, TuiArgs};
use crate::data::TimeSeriesRepository;
use crate::domain::ChartRequest;
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{legend_line, CountryChart};

/// Start the TUI.
pub fn run(repo: TimeSeriesRepository, args: TuiArgs) -> Result<(), AppError> {
    let mut app = App::new(repo, &args);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    repo: TimeSeriesRepository,
    countries: Vec<String>,
    filter: String,
    editing_filter: bool,
    /// Index into `visible_countries()`.
    selected: usize,
    request: ChartRequest,
    view: Option<CountryView>,
    status: String,
}

impl App {
    fn new(repo: TimeSeriesRepository, args: &TuiArgs) -> Self {
        let countries: Vec<String> = repo.countries().into_iter().collect();
        let selected = args
            .country
            .as_ref()
            .and_then(|c| countries.iter().position(|n| n == c))
            .unwrap_or(0);
        let request = ChartRequest {
            window: window_from_weeks(args.weeks),
            lag: args.lag,
            deaths_only: args.deaths_only,
            ..ChartRequest::default()
        };

        let mut app = Self {
            repo,
            countries,
            filter: String::new(),
            editing_filter: false,
            selected,
            request,
            view: None,
            status: String::new(),
        };
        app.rebuild_view();
        app
    }

    fn visible_countries(&self) -> Vec<&String> {
        let needle = self.filter.to_lowercase();
        self.countries
            .iter()
            .filter(|c| needle.is_empty() || c.to_lowercase().contains(&needle))
            .collect()
    }

    fn selected_country(&self) -> Option<String> {
        self.visible_countries().get(self.selected).map(|c| c.to_string())
    }

    fn rebuild_view(&mut self) {
        let Some(country) = self.selected_country() else {
            self.view = None;
            self.status = "No country matches the filter.".to_string();
            return;
        };
        match build_country_view(&self.repo, &[country.as_str()], &self.request) {
            Ok(view) => {
                self.status = format!("{country}: {} days", view.series.len());
                self.view = Some(view);
            }
            Err(err) => {
                self.view = None;
                self.status = err.to_string();
            }
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_filter {
            self.handle_filter_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.rebuild_view();
                }
            }
            KeyCode::Down => {
                if self.selected + 1 < self.visible_countries().len() {
                    self.selected += 1;
                    self.rebuild_view();
                }
            }
            KeyCode::Left | KeyCode::Right => {
                let delta = if code == KeyCode::Right { 1 } else { -1 };
                self.request.lag = self.request.lag.step(delta);
                self.rebuild_view();
            }
            KeyCode::Char('w') => {
                self.request.window = self.request.window.next();
                self.rebuild_view();
            }
            KeyCode::Char('d') => {
                self.request.deaths_only = !self.request.deaths_only;
                self.rebuild_view();
            }
            KeyCode::Char('/') => {
                self.editing_filter = true;
                self.status = "Filter countries. Enter to apply, Esc to clear.".to_string();
            }
            _ => {}
        }
        false
    }

    fn handle_filter_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_filter = false;
                self.filter.clear();
                self.selected = 0;
                self.rebuild_view();
            }
            KeyCode::Enter => {
                self.editing_filter = false;
                self.rebuild_view();
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.selected = 0;
            }
            KeyCode::Char(c) => {
                self.filter.push(c);
                self.selected = 0;
            }
            _ => {}
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        let title = self
            .view
            .as_ref()
            .map(|v| v.title())
            .unwrap_or_else(|| "covid".to_string());
        lines.push(Line::from(Span::styled(title, Style::default().fg(Color::Cyan))));
        lines.push(Line::from(Span::styled(
            format!(
                "lag: {} | window: {} | {} | countries: {}",
                self.request.lag,
                self.request.window,
                if self.request.deaths_only { "deaths only" } else { "all columns" },
                self.countries.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(0)])
            .split(area);

        self.draw_list(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_list(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .visible_countries()
            .into_iter()
            .map(|c| ListItem::new(c.as_str()))
            .collect();
        let title = if self.filter.is_empty() {
            "Countries".to_string()
        } else {
            format!("Countries /{}", self.filter)
        };

        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut block = Block::default().title("Chart").borders(Borders::ALL);
        if let Some(view) = &self.view {
            block = block.title_bottom(legend_line(view));
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.view else {
            let msg = Paragraph::new("No data.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        frame.render_widget(CountryChart { view }, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ country  ←/→ lag  w window  d deaths  / filter  q quit";
        let mut spans = vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
        ];
        let status_style = if self.editing_filter {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        spans.push(Span::styled(self.status.as_str(), status_style));
        let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
