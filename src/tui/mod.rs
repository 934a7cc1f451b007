//! Ratatui-based terminal dashboard.
//!
//! The dashboard provides a settings panel for choosing the start and end
//! dates, then renders the ex-ante chart, the reduction-estimate table and an
//! export key for the rate frame. Pipeline failures never leave the dashboard;
//! they replace the results with a single status message.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
};

use crate::app::pipeline::RunOutput;
use crate::cli::TuiArgs;
use crate::data::SeriesSource;
use crate::domain::{DateRange, Month, NEUTRAL_RATE_BANDS, RateFrame};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::ExAntePlottersChart;

const FIELD_COUNT: usize = 2;

/// Start the dashboard.
pub fn run(source: Box<dyn SeriesSource>, args: &TuiArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let today = chrono::Local::now().date_naive();
    let mut app = App::new(source, args, today);

    // Paint once so the user sees the fetch status before the first (blocking) fetch.
    terminal
        .draw(|f| app.draw(f))
        .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
    app.refresh();

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
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
    source: Box<dyn SeriesSource>,
    export_path: PathBuf,
    start_input: String,
    end_input: String,
    edit_buffer: String,
    selected_field: usize,
    editing: bool,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(source: Box<dyn SeriesSource>, args: &TuiArgs, today: NaiveDate) -> Self {
        Self {
            source,
            export_path: args.export.clone(),
            start_input: args.range.start.to_string(),
            end_input: args.range.end.unwrap_or(today).to_string(),
            edit_buffer: String::new(),
            selected_field: 0,
            editing: false,
            status: "Fetching Banxico data...".to_string(),
            run: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
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
        if self.editing {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Enter => {
                self.editing = true;
                self.edit_buffer = self.selected_input().clone();
                self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                let value = self.edit_buffer.trim().to_string();
                *self.selected_input_mut() = value;
                self.refresh();
            }
            KeyCode::Backspace => {
                self.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.edit_buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn selected_input(&self) -> &String {
        if self.selected_field == 0 { &self.start_input } else { &self.end_input }
    }

    fn selected_input_mut(&mut self) -> &mut String {
        if self.selected_field == 0 { &mut self.start_input } else { &mut self.end_input }
    }

    fn requested_range(&self) -> Result<DateRange, AppError> {
        let start = crate::cli::parse_date(&self.start_input).map_err(AppError::config)?;
        let end = crate::cli::parse_date(&self.end_input).map_err(AppError::config)?;
        DateRange::new(start, end)
    }

    /// Re-run the whole pipeline. Errors are shown, never propagated.
    fn refresh(&mut self) {
        let result = self
            .requested_range()
            .and_then(|range| crate::app::pipeline::run(self.source.as_ref(), range));

        match result {
            Ok(run) => {
                self.status = format!(
                    "Fetched {} | ex-ante months: {}",
                    run.range,
                    run.analysis.rates.rows.len()
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.run = None;
                self.status = format!("Error: {err}");
            }
        }
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        self.status = match crate::io::write_rate_csv_file(&self.export_path, &run.analysis.rates) {
            Ok(()) => format!("Wrote {}", self.export_path.display()),
            Err(err) => format!("Error: {err}"),
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
            Span::styled("exante", Style::default().fg(Color::Cyan)),
            Span::raw(" | ex-ante real rate and expected policy cuts (Banxico SIE)"),
        ]));

        let latest = self
            .run
            .as_ref()
            .and_then(|r| r.analysis.rates.latest())
            .map(|row| format!("{} ex-ante={:.2}%", row.month, row.ex_ante))
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "start: {} | end: {} | latest: {latest}",
                self.start_input, self.end_input
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[1]);

        self.draw_settings(frame, bottom[0]);
        self.draw_reduction(frame, bottom[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Short-Term Ex-Ante Real Rate (%) | neutral 1.8 / 2.6 / 3.4")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No data.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let Some(data) = chart_series(&run.analysis.rates) else {
            let msg = Paragraph::new("No overlapping data for the selected range.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = ExAntePlottersChart {
            points: &data.points,
            bands: &NEUTRAL_RATE_BANDS,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "month",
            y_label: "ex-ante (%)",
            fmt_x: fmt_axis_month,
            fmt_y: fmt_axis_pct,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, data.x_bounds, data.y_bounds);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let shown = |idx: usize, value: &str| -> String {
            if self.editing && self.selected_field == idx {
                format!("{}_", self.edit_buffer)
            } else {
                value.to_string()
            }
        };

        let items = vec![
            ListItem::new(format!("Start: {}", shown(0, &self.start_input))),
            ListItem::new(format!("End:   {}", shown(1, &self.end_input))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing {
            let hint = Paragraph::new("Editing date…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_reduction(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Expected average reduction per meeting")
            .borders(Borders::ALL);

        let Some(est) = self.run.as_ref().and_then(|r| r.analysis.reduction) else {
            let msg = Paragraph::new("(no overlapping data)")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let header = Row::new(["month", "target", "year-end", "gap", "meetings", "avg cut"])
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
        let row = Row::new(vec![
            Cell::from(est.month.to_string()),
            Cell::from(format!("{:.2}", est.policy_target)),
            Cell::from(format!("{:.2}", est.year_end_forecast)),
            Cell::from(format!("{:.2}", est.gap)),
            Cell::from(est.meeting_count.to_string()),
            Cell::from(format!("{:.2}", est.average_reduction_per_meeting)),
        ]);
        let widths = [
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(8),
        ];
        let table = Table::new([row], widths).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  Enter edit date  r refresh  e export CSV  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart inputs derived from a rate frame.
#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    points: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for Plotters; `None` when the frame is empty.
fn chart_series(frame: &RateFrame) -> Option<ChartData> {
    let first = frame.rows.first()?;
    let last = frame.rows.last()?;

    let points: Vec<(f64, f64)> = frame
        .rows
        .iter()
        .map(|r| (r.month.ordinal() as f64, r.ex_ante))
        .collect();

    let mut x0 = first.month.ordinal() as f64;
    let mut x1 = last.month.ordinal() as f64;
    if x1 <= x0 {
        x0 -= 0.5;
        x1 += 0.5;
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for y in points.iter().map(|&(_, y)| y).chain(NEUTRAL_RATE_BANDS) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    Some(ChartData {
        points,
        x_bounds: [x0, x1],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

fn fmt_axis_month(v: f64) -> String {
    Month::from_ordinal(v.round() as i32)
        .map(|m| m.to_string())
        .unwrap_or_default()
}

fn fmt_axis_pct(v: f64) -> String {
    format!("{v:.1}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_month(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2).max(inner.x);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len.min(inner.x + inner.width - start),
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_pct(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("month")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("%").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
