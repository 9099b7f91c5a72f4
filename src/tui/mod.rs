//! Ratatui-based terminal dashboard.
//!
//! The dashboard shows the summary cards, the per-ad table and a spend vs
//! revenue chart for the selected preset. Fetches run on a worker thread so
//! the UI stays responsive; results are applied through the session's
//! request-generation fence, so a slow answer for an old preset never
//! overwrites a newer one.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use chrono::Utc;
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
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
};
use tracing::info;

use crate::app::pipeline::ReportConfig;
use crate::app::session::{LoadOutcome, LoadTicket, Session};
use crate::config::Config;
use crate::data::{AdsQuery, DateSelection, WindsorClient};
use crate::domain::{AdStatus, RawAdRow};
use crate::error::AppError;
use crate::metrics::{AdGroup, ad_status};
use crate::report::{fmt_count, fmt_money, fmt_money_opt, fmt_ratio, range_label, summary_cards, truncate};

mod plotters_chart;

use plotters_chart::SpendRevenueChart;

type FetchResult = (LoadTicket, Result<Vec<RawAdRow>, AppError>);

/// Start the TUI.
pub fn run(config: Config, report: ReportConfig) -> Result<(), AppError> {
    // Fail on a missing API key before touching the terminal.
    let client = Arc::new(WindsorClient::new(config.clone())?);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::api(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(client, &config, &report);
    app.request_load();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::api(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::api(format!("Failed to enter alternate screen: {e}")));
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
    client: Arc<WindsorClient>,
    base_query: AdsQuery,
    session: Session,
    table: TableState,
    status: String,
    tx: Sender<FetchResult>,
    rx: Receiver<FetchResult>,
}

impl App {
    fn new(client: Arc<WindsorClient>, config: &Config, report: &ReportConfig) -> Self {
        let tz = report.timezone.unwrap_or(config.timezone);
        let (tx, rx) = mpsc::channel();
        Self {
            client,
            base_query: report.query(),
            session: Session::new(report.preset, report.status, tz),
            table: TableState::default(),
            status: String::new(),
            tx,
            rx,
        }
    }

    /// Issue a fetch for the session's current preset on a worker thread.
    fn request_load(&mut self) {
        let ticket = self.session.begin_load();
        let mut query = self.base_query.clone();
        query.date = DateSelection::Preset(ticket.preset);

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        info!(preset = %ticket.preset, generation = ticket.generation, "loading ads");
        thread::spawn(move || {
            let result = client.fetch_rows(&query);
            // The receiver is gone only when the UI has exited.
            let _ = tx.send((ticket, result));
        });
        self.status = format!("Loading {}…", ticket.preset.label());
    }

    /// Apply any finished fetches. Returns true when something changed.
    fn drain_results(&mut self) -> bool {
        let mut changed = false;
        while let Ok((ticket, result)) = self.rx.try_recv() {
            match self.session.finish_load(ticket, result) {
                LoadOutcome::Applied { rows } => {
                    self.status = format!("Loaded {rows} rows for {}.", ticket.preset.label());
                    self.table.select((!self.session.groups().is_empty()).then_some(0));
                    changed = true;
                }
                LoadOutcome::Failed(msg) => {
                    self.status = format!("Load failed: {msg}");
                    changed = true;
                }
                LoadOutcome::Stale => {}
            }
        }
        changed
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.drain_results() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::api(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::api(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::api(format!("Event read error: {e}")))? {
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

    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => {
                self.session.preset = self.session.preset.prev();
                self.request_load();
            }
            KeyCode::Right => {
                self.session.preset = self.session.preset.next();
                self.request_load();
            }
            KeyCode::Char('r') => self.request_load(),
            KeyCode::Char('s') => {
                let next = self.session.status_filter.next();
                self.session.set_status_filter(next);
                self.table.select((!self.session.groups().is_empty()).then_some(0));
                self.status = format!("status: {}", next.label());
            }
            KeyCode::Up => {
                let i = self.table.selected().unwrap_or(0);
                self.table.select(Some(i.saturating_sub(1)));
            }
            KeyCode::Down => {
                let last = self.session.groups().len().saturating_sub(1);
                let i = self.table.selected().map(|i| (i + 1).min(last)).unwrap_or(0);
                self.table.select(Some(i));
            }
            _ => {}
        }
        false
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_cards(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let range = self.session.range_at(Utc::now());
        let summary = self.session.summary();

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("Curveez", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" · Ad performance"),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "{} | ads: {} (ON {} / OFF {}) | filter: {}",
                range_label(self.session.preset.label(), &range, self.session.timezone),
                summary.ads,
                summary.ads_on,
                summary.ads_off(),
                self.session.status_filter.label(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_cards(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cards = summary_cards(&self.session.summary().metrics);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, cards.len() as u32); 6])
            .split(area);

        for ((label, value), rect) in cards.iter().zip(cols.iter()) {
            let p = Paragraph::new(Line::from(Span::styled(
                value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(Block::default().title(*label).borders(Borders::ALL));
            frame.render_widget(p, *rect);
        }
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);

        self.draw_table(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_table(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Ads (most purchases first)").borders(Borders::ALL);

        let groups = self.session.groups();
        if groups.is_empty() {
            let msg = if self.session.loading && self.session.loaded_preset().is_none() {
                "Loading data…"
            } else {
                "No ads available."
            };
            let p = Paragraph::new(msg)
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(p, area);
            return;
        }

        let header = Row::new(["", "ad", "campaign", "spend", "buys", "cpa", "revenue", "roas"])
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = groups.iter().map(ad_row).collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Min(16),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(6),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        frame.render_stateful_widget(table, area, &mut self.table);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Spend vs revenue").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let groups = self.session.groups();
        if groups.is_empty() {
            return;
        }

        let (on, off, x_bounds, y_bounds) = chart_series(groups);
        let widget = SpendRevenueChart {
            on: &on,
            off: &off,
            x_bounds,
            y_bounds,
            fmt_axis: fmt_axis_money,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ preset  s status  r refresh  ↑/↓ scroll  q quit";
        let status_style = if self.session.last_error.is_some() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, status_style),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn ad_row(group: &AdGroup) -> Row<'static> {
    let m = group.metrics();
    let status = ad_status(&group.row);
    let status_style = match status {
        AdStatus::On => Style::default().fg(Color::Green),
        AdStatus::Off => Style::default().fg(Color::DarkGray),
    };
    Row::new(vec![
        Cell::from(status.label()).style(status_style),
        Cell::from(group.row.ad_name().unwrap_or_default()),
        Cell::from(truncate(&group.row.campaign().unwrap_or_default(), 14)),
        Cell::from(fmt_money(m.spend)),
        Cell::from(fmt_count(m.purchases)),
        Cell::from(fmt_money_opt(m.cpa())),
        Cell::from(fmt_money(m.revenue)),
        Cell::from(fmt_ratio(m.roas())),
    ])
}

type Series = Vec<(f64, f64)>;

/// Split ads into ON/OFF (spend, revenue) points and compute padded bounds.
fn chart_series(groups: &[AdGroup]) -> (Series, Series, [f64; 2], [f64; 2]) {
    let mut on = Vec::new();
    let mut off = Vec::new();
    let (mut x_max, mut y_max) = (0.0_f64, 0.0_f64);

    for g in groups {
        let m = g.metrics();
        x_max = x_max.max(m.spend);
        y_max = y_max.max(m.revenue);
        match ad_status(&g.row) {
            AdStatus::On => on.push((m.spend, m.revenue)),
            AdStatus::Off => off.push((m.spend, m.revenue)),
        }
    }

    let bound = |max: f64| if max.is_finite() && max > 0.0 { max * 1.05 } else { 1.0 };
    (on, off, [0.0, bound(x_max)], [0.0, bound(y_max)])
}

fn fmt_axis_money(v: f64) -> String {
    if v >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.1}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregate;
    use serde_json::json;

    #[test]
    fn chart_series_splits_by_status() {
        let rows = vec![
            RawAdRow::from_value(json!({"ad_id": "1", "ad_name": "A", "totalcost": "100", "action_values_omni_purchase": "250", "status": "ACTIVE"})).unwrap(),
            RawAdRow::from_value(json!({"ad_id": "2", "ad_name": "B", "totalcost": "40"})).unwrap(),
        ];
        let (on, off, x, y) = chart_series(&aggregate(&rows));
        assert_eq!(on, vec![(100.0, 250.0)]);
        assert_eq!(off, vec![(40.0, 0.0)]);
        assert_eq!(x[0], 0.0);
        assert!((x[1] - 105.0).abs() < 1e-9);
        assert!((y[1] - 262.5).abs() < 1e-9);
    }

    #[test]
    fn chart_bounds_never_collapse() {
        let rows = vec![RawAdRow::from_value(json!({"ad_id": "1", "ad_name": "A"})).unwrap()];
        let (_, _, x, y) = chart_series(&aggregate(&rows));
        assert_eq!(x, [0.0, 1.0]);
        assert_eq!(y, [0.0, 1.0]);
    }

    #[test]
    fn axis_labels_are_compact() {
        assert_eq!(fmt_axis_money(950.0), "950");
        assert_eq!(fmt_axis_money(1_500.0), "1.5k");
        assert_eq!(fmt_axis_money(2_000_000.0), "2.0M");
    }
}
