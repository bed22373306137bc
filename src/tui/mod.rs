//! Ratatui-based terminal UI.
//!
//! The dashboard shows one chart series at a time for the collected window,
//! with a series picker on the side and an editable end date.

use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::warn;

use crate::app::pipeline::{self, RunOutput, Sources};
use crate::config::Config;
use crate::domain::{ChartSeries, DateKey, Provider, RunConfig};
use crate::error::{AppError, EXIT_PROVIDER};
use crate::plot::ChartData;

mod plotters_chart;

use plotters_chart::WeekPlottersChart;

const EXPORT_DIR: &str = "charts";

/// Start the TUI.
pub fn run(run: RunConfig, config: Config) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_PROVIDER, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(run, config);
    app.refresh();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(EXIT_PROVIDER, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_PROVIDER, format!("Failed to enter alternate screen: {e}")));
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
    run: RunConfig,
    config: Config,
    series: ChartSeries,
    date_input: String,
    editing_date: bool,
    status: String,
    output: Option<RunOutput>,
    /// Provider clients, built on the first provider refresh and reused.
    sources: Option<Sources>,
}

impl App {
    fn new(run: RunConfig, config: Config) -> Self {
        let date_input = run.end_date.map(|d| d.to_string()).unwrap_or_default();
        Self {
            run,
            config,
            series: ChartSeries::Running,
            date_input,
            editing_date: false,
            status: "Collecting...".to_string(),
            output: None,
            sources: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_PROVIDER, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_PROVIDER, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_PROVIDER, format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_date {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Left => {
                self.series = self.series.prev();
                self.status = format!("series: {}", self.series.title());
            }
            KeyCode::Down | KeyCode::Right => {
                self.series = self.series.next();
                self.status = format!("series: {}", self.series.title());
            }
            KeyCode::Enter => {
                self.editing_date = true;
                self.status = "Editing end date (YYYY-MM-DD, empty = today). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('e') => self.export_current(Path::new(EXPORT_DIR)),
            _ => {}
        }
        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.date_input = self.run.end_date.map(|d| d.to_string()).unwrap_or_default();
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                if self.apply_date_input() {
                    self.refresh();
                }
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    /// Parse the edited end date into the run config; `false` if it was rejected.
    fn apply_date_input(&mut self) -> bool {
        let trimmed = self.date_input.trim();
        if trimmed.is_empty() {
            self.run.end_date = None;
            return true;
        }
        match DateKey::parse(trimmed) {
            Ok(key) => {
                self.run.end_date = Some(key.date());
                true
            }
            Err(e) => {
                self.status = e.to_string();
                false
            }
        }
    }

    /// Collect the window again; failures stay on screen instead of exiting.
    fn refresh(&mut self) {
        match self.collect() {
            Ok(output) => {
                self.status = collect_status(&output);
                self.output = Some(output);
            }
            Err(err) => {
                warn!(error = %err, "collect failed");
                self.status = format!("Collect failed: {err}");
            }
        }
    }

    fn collect(&mut self) -> Result<RunOutput, AppError> {
        if self.run.dataset.is_some() {
            return pipeline::run_collect(&self.run, &self.config);
        }
        let range = pipeline::resolve_range(&self.run)?;
        let sources = cached_sources(&mut self.sources, &self.config, &self.run)?;
        pipeline::collect_dataset(range, sources, &self.run)
    }

    fn current_chart(&self) -> Option<ChartData> {
        self.output
            .as_ref()
            .map(|out| ChartData::from_dataset(&out.dataset, self.series, self.run.default_value))
    }

    fn export_current(&mut self, dir: &Path) {
        let Some(chart) = self.current_chart() else {
            self.status = "Nothing collected yet.".to_string();
            return;
        };
        let path = dir.join(format!("{}.svg", self.series.slug()));
        let result = std::fs::create_dir_all(dir)
            .map_err(|e| AppError::config(format!("Failed to create chart dir '{}': {e}", dir.display())))
            .and_then(|()| crate::plot::write_chart(&path, &chart));
        self.status = match result {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
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
        lines.push(Line::from(vec![
            Span::styled("lifedb", Style::default().fg(Color::Cyan)),
            Span::raw(" | daily metrics by date"),
        ]));

        let window = self
            .output
            .as_ref()
            .map(|out| {
                let range = out.dataset.range();
                format!("{} to {} ({} days)", range.start(), range.end(), range.num_days())
            })
            .unwrap_or_else(|| "-".to_string());
        let source = match &self.run.dataset {
            Some(path) => format!("snapshot {}", path.display()),
            None => {
                let used: Vec<&str> = [Provider::Fitbit, Provider::Gmail]
                    .into_iter()
                    .filter(|p| self.run.uses(*p))
                    .map(Provider::display_name)
                    .collect();
                if used.is_empty() { "none".to_string() } else { used.join(" + ") }
            }
        };

        lines.push(Line::from(Span::styled(
            format!("window: {window} | source: {source} | missing = {}", self.run.default_value),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(24)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_series_list(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(chart) = self.current_chart() else {
            let block = Block::default().title("Chart").borders(Borders::ALL);
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let block = Block::default().title(chart.title.clone()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let widget = WeekPlottersChart {
            labels: &chart.labels,
            values: &chart.values,
            kind: chart.kind,
            y_bounds: chart.y_bounds(),
            y_label: &chart.y_label,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_series_list(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items: Vec<ListItem> = ChartSeries::ALL
            .iter()
            .map(|s| ListItem::new(s.title()))
            .collect();

        let end_label = if self.editing_date {
            format!("End: {}_", self.date_input)
        } else if self.date_input.trim().is_empty() {
            "End: today".to_string()
        } else {
            format!("End: {}", self.date_input.trim())
        };
        items.push(ListItem::new(""));
        let end_style = if self.editing_date {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        items.push(ListItem::new(end_label).style(end_style));

        let list = List::new(items)
            .block(Block::default().title("Series").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(ChartSeries::ALL.iter().position(|s| *s == self.series));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ series  Enter end date  r refresh  e export svg  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build the provider clients on first use; later calls return the same ones.
fn cached_sources<'a>(
    slot: &'a mut Option<Sources>,
    config: &Config,
    run: &RunConfig,
) -> Result<&'a Sources, AppError> {
    if slot.is_none() {
        *slot = Some(Sources::from_config(config, run)?);
    }
    slot.as_ref()
        .ok_or_else(|| AppError::config("Provider clients are unavailable."))
}

fn collect_status(output: &RunOutput) -> String {
    let report = &output.report;
    let mut status = format!(
        "merged weight={} sleep={} running={}",
        report.weight.merged, report.sleep.merged, report.running.merged
    );
    if !report.skipped_sleep.is_empty() {
        status.push_str(&format!(" | no main sleep on {} day(s)", report.skipped_sleep.len()));
    }
    status
}
