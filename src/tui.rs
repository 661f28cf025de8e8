//! Interactive dashboard: symbol selector, signal panel, close chart,
//! momentum listing, news sentiment, alert banner.

use anyhow::Result;
use chrono::DateTime;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Sparkline, Table},
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::refresh::{self, RefreshContext, RefreshData};
use crate::scan::ScanStatus;
use crate::sentiment::SentimentLabel;

// --- App State ---

struct App {
    ctx: Arc<RefreshContext>,
    data: Option<RefreshData>,
    is_refreshing: bool,
    universe: Vec<String>,
    selected_symbol_index: usize,
    last_trigger: Instant,
}

impl App {
    fn new(ctx: Arc<RefreshContext>) -> Self {
        let universe = ctx.config.universe.clone();
        Self {
            ctx,
            data: None,
            is_refreshing: false,
            universe,
            selected_symbol_index: 0,
            last_trigger: Instant::now(),
        }
    }

    fn selected_symbol(&self) -> &str {
        &self.universe[self.selected_symbol_index]
    }

    fn set_data(&mut self, new_data: RefreshData) {
        self.data = Some(new_data);
        self.is_refreshing = false;
    }

    /// Kick off a refresh for the selected symbol on a background task.
    /// The draw loop keeps running; the result arrives over the channel.
    fn trigger_refresh(&mut self, tx: &mpsc::Sender<RefreshData>) {
        if self.is_refreshing {
            return;
        }
        self.is_refreshing = true;
        self.last_trigger = Instant::now();
        let ctx = Arc::clone(&self.ctx);
        let symbol = self.selected_symbol().to_string();
        let tx_clone = tx.clone();
        tokio::spawn(async move {
            let data = refresh::run_refresh(&ctx, &symbol).await;
            let _ = tx_clone.send(data).await;
        });
    }
}

// --- TUI ---

pub async fn run_tui(ctx: Arc<RefreshContext>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, ctx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, ctx: Arc<RefreshContext>) -> Result<()> {
    let (data_tx, mut data_rx) = mpsc::channel::<RefreshData>(1);
    let mut app = App::new(ctx);

    // Populate the dashboard immediately instead of waiting for a keypress.
    app.trigger_refresh(&data_tx);

    let auto_refresh = app.ctx.config.refresh_secs;

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if let Ok(new_data) = data_rx.try_recv() {
            app.set_data(new_data);
        }

        // Timer-driven re-run of the same refresh sequence.
        if auto_refresh > 0
            && !app.is_refreshing
            && app.last_trigger.elapsed() >= Duration::from_secs(auto_refresh)
        {
            app.trigger_refresh(&data_tx);
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                // Handle key presses
                Event::Key(key) => {
                    if !handle_key_event(key, &mut app, &data_tx) {
                        return Ok(());
                    }
                }
                // Handle window resizing explicitly
                Event::Resize(_, _) => {
                    // The loop will continue and terminal.draw() will automatically
                    // pick up the new size on the next iteration.
                }
                _ => {}
            }
        }
    }
}

fn handle_key_event(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<RefreshData>) -> bool {
    match key.code {
        KeyCode::Char('q') => return false,
        KeyCode::F(5) | KeyCode::Char('r') => app.trigger_refresh(tx),
        KeyCode::Up => {
            if !app.universe.is_empty() {
                app.selected_symbol_index = app
                    .selected_symbol_index
                    .checked_sub(1)
                    .unwrap_or(app.universe.len() - 1);
                app.trigger_refresh(tx);
            }
        }
        KeyCode::Down => {
            if !app.universe.is_empty() {
                app.selected_symbol_index =
                    (app.selected_symbol_index + 1) % app.universe.len();
                app.trigger_refresh(tx);
            }
        }
        KeyCode::Char(c) => {
            if c.is_ascii_digit() {
                let digit = c.to_digit(10).unwrap_or(0);
                if digit > 0 && digit <= app.universe.len() as u32 {
                    app.selected_symbol_index = (digit - 1) as usize;
                    app.trigger_refresh(tx);
                }
            }
        }
        _ => {}
    }
    true
}

fn ui(f: &mut Frame, app: &App) {
    let main_layout = Layout::horizontal([Constraint::Percentage(18), Constraint::Percentage(82)])
        .split(f.size());

    render_sidebar(f, app, main_layout[0]);

    let right_chunks = Layout::vertical([
        Constraint::Length(3), // Last updated header
        Constraint::Length(4), // Alert banner
        Constraint::Length(6), // Signal panel
        Constraint::Length(5), // Close chart
        Constraint::Min(5),    // Momentum table
        Constraint::Length(7), // News sentiment
    ])
    .split(main_layout[1]);

    let time_str = app
        .data
        .as_ref()
        .map_or_else(|| "Never".to_string(), |d| format_timestamp(d.generated_at_ms));
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title_alignment(Alignment::Center)
            .title(format!("Last Updated: {}", time_str)),
        right_chunks[0],
    );

    render_alert_banner(f, app, right_chunks[1]);
    render_signals(f, app, right_chunks[2]);
    render_close_chart(f, app, right_chunks[3]);
    render_momentum_table(f, app, right_chunks[4]);
    render_news(f, app, right_chunks[5]);

    if app.is_refreshing {
        let area = centered_rect(60, 20, main_layout[1]);
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new("Running scan pipeline...\nPlease wait.")
                .block(Block::default().title("Refreshing").borders(Borders::ALL))
                .alignment(Alignment::Center),
            area,
        );
    }
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let sidebar_block = Block::default()
        .borders(Borders::ALL)
        .title("Symbols")
        .title_alignment(Alignment::Center);
    let inner_sidebar_area = sidebar_block.inner(area);
    f.render_widget(sidebar_block, area);

    let sidebar_chunks = Layout::vertical([
        Constraint::Min(1),    // Symbol list
        Constraint::Length(1), // Key help
    ])
    .split(inner_sidebar_area);

    let symbol_lines: Vec<Line> = app
        .universe
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            let mut line = Line::from(symbol.clone());
            if i == app.selected_symbol_index {
                line = line.style(Style::default().fg(Color::Yellow).bg(Color::DarkGray));
            }
            line
        })
        .collect();

    f.render_widget(Paragraph::new(symbol_lines), sidebar_chunks[0]);

    f.render_widget(
        Paragraph::new("F5 refresh / q quit").alignment(Alignment::Center),
        sidebar_chunks[1],
    );
}

fn render_alert_banner(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Alerts");

    let lines: Vec<Line> = match &app.data {
        Some(data) if !data.alerts.is_empty() => data
            .alerts
            .iter()
            .map(|alert| {
                Line::from(alert.message.clone())
                    .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            })
            .collect(),
        Some(_) => vec![Line::from("No active trade signals at the moment.")
            .style(Style::default().fg(Color::DarkGray))],
        None => vec![Line::from("Waiting for first scan...")
            .style(Style::default().fg(Color::DarkGray))],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_signals(f: &mut Frame, app: &App, area: Rect) {
    let symbol = app.selected_symbol();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Signals: {symbol}"));

    let lines: Vec<Line> = match &app.data {
        Some(data) if data.focus.status == ScanStatus::Complete => {
            let signals = &data.focus.signals;
            let rsi_str = signals
                .rsi
                .map_or("warming up".to_string(), |v| format!("{v:.2}"));
            let levels_str = match (signals.support, signals.resistance) {
                (Some(s), Some(r)) => format!("{s:.2} / {r:.2}"),
                _ => "n/a".to_string(),
            };
            let volume_line = match &signals.volume {
                Some(v) if v.spiked => Line::from(format!(
                    "Volume: {:.0} vs {:.0} avg  << SPIKE",
                    v.current, v.average
                ))
                .style(Style::default().fg(Color::Red)),
                Some(v) => Line::from(format!("Volume: {:.0} vs {:.0} avg", v.current, v.average)),
                None => Line::from("Volume: n/a"),
            };
            let patterns_line = if signals.patterns.is_empty() {
                Line::from("Patterns: none").style(Style::default().fg(Color::DarkGray))
            } else {
                let names: Vec<String> = signals
                    .patterns
                    .iter()
                    .map(|h| {
                        format!("{} {}", h.name, if h.is_bullish() { "(+)" } else { "(-)" })
                    })
                    .collect();
                Line::from(format!("Patterns: {}", names.join(", ")))
                    .style(Style::default().fg(Color::Yellow))
            };
            vec![
                Line::from(format!("RSI: {rsi_str}")),
                Line::from(format!("Support / Resistance: {levels_str}")),
                volume_line,
                patterns_line,
            ]
        }
        Some(_) => vec![Line::from("No data for this symbol (fetch skipped).")
            .style(Style::default().fg(Color::DarkGray))],
        None => vec![Line::from("Waiting for first scan...")
            .style(Style::default().fg(Color::DarkGray))],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_close_chart(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Close");

    let closes: &[f64] = app.data.as_ref().map_or(&[], |d| &d.focus.closes);
    // Rescale the tail of the close series into sparkline buckets.
    let width = area.width.saturating_sub(2) as usize;
    let tail_start = closes.len().saturating_sub(width.max(1));
    let tail = &closes[tail_start..];

    let (min, max) = tail.iter().fold((f64::MAX, f64::MIN), |(lo, hi), &c| {
        (lo.min(c), hi.max(c))
    });
    let span = if max > min { max - min } else { 1.0 };
    let scaled: Vec<u64> = tail
        .iter()
        .map(|&c| (1.0 + (c - min) / span * 99.0) as u64)
        .collect();

    f.render_widget(
        Sparkline::default()
            .block(block)
            .data(&scaled)
            .style(Style::default().fg(Color::Cyan)),
        area,
    );
}

fn render_momentum_table(f: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Rank"),
        Cell::from("Symbol"),
        Cell::from("RSI (1d)"),
        Cell::from("Close"),
        Cell::from("Volume"),
    ])
    .style(Style::default().bg(Color::DarkGray));

    let entries = app.data.as_ref().map_or(&[][..], |d| &d.momentum[..]);

    // Scale color against the strongest RSI so leaders stand out.
    let top_rsi = entries
        .iter()
        .map(|e| e.rsi)
        .fold(f64::MIN, f64::max)
        .max(1.0);

    let rows = entries.iter().enumerate().map(move |(i, entry)| {
        let ratio = get_visibility_ratio(entry.rsi, top_rsi);
        let cyan_val = (255.0 * ratio) as u8;
        let green_val = (255.0 * ratio) as u8;

        Row::new([
            Cell::from(format!("{}", i + 1)).style(Style::default().fg(Color::DarkGray)),
            Cell::from(entry.symbol.clone())
                .style(Style::default().fg(Color::Rgb(0, cyan_val, cyan_val))),
            Cell::from(format!("{:.2}", entry.rsi))
                .style(Style::default().fg(Color::Rgb(0, green_val, 0))),
            Cell::from(format!("{:.2}", entry.close)),
            Cell::from(format!("{:.0}", entry.volume)),
        ])
        .height(1)
    });

    f.render_widget(
        Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Percentage(30),
                Constraint::Percentage(20),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Bullish Momentum"),
        ),
        area,
    );
}

fn render_news(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("News");

    let lines: Vec<Line> = match &app.data {
        Some(data) if !data.news.is_empty() => data
            .news
            .iter()
            .map(|item| {
                let color = match item.label {
                    SentimentLabel::Positive => Color::Green,
                    SentimentLabel::Negative => Color::Red,
                    SentimentLabel::Neutral => Color::Gray,
                };
                Line::from(vec![
                    Span::styled(format!("[{}] ", item.label), Style::default().fg(color)),
                    Span::raw(item.title.clone()),
                ])
            })
            .collect(),
        _ => vec![
            Line::from("No headlines.").style(Style::default().fg(Color::DarkGray)),
        ],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn get_visibility_ratio(current: f64, top: f64) -> f64 {
    if top <= 0.0 {
        1.0
    } else {
        (0.4 + 0.6 * (current / top)).max(0.4)
    }
}

fn format_timestamp(ts_ms: i64) -> String {
    if ts_ms == 0 {
        return "Never".to_string();
    }
    let seconds = ts_ms / 1000;
    let nanoseconds = (ts_ms % 1000 * 1_000_000) as u32;
    DateTime::from_timestamp(seconds, nanoseconds)
        .map(|dt| dt.format("%d-%m-%Y %H:%M:%S").to_string())
        .unwrap_or_else(|| "Unknown Time".to_string())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
