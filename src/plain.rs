//! Plain stdout rendering for terminals where the TUI is unwanted.
//!
//! Runs the same refresh sequence, prints a momentum table plus alerts and
//! news sentiment, then sleeps the configured interval and repeats. With a
//! zero interval it renders once and exits.

use anyhow::Result;
use chrono::DateTime;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table,
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_BORDERS_ONLY,
};
use std::sync::Arc;
use std::time::Duration;

use crate::refresh::{self, RefreshContext, RefreshData};
use crate::scan::ScanStatus;

pub async fn run(ctx: Arc<RefreshContext>) -> Result<()> {
    // The focused symbol is fixed to the head of the universe in plain mode;
    // there is no selector to drive.
    let symbol = ctx.config.universe[0].clone();
    let interval = ctx.config.refresh_secs;

    loop {
        let data = refresh::run_refresh(&ctx, &symbol).await;
        clearscreen::clear()?;
        render(&symbol, &data);

        if interval == 0 {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(interval)).await;
    }
}

fn render(symbol: &str, data: &RefreshData) {
    let time_str = format_timestamp(data.generated_at_ms);
    println!("(Scan taken at {} UTC)\n", time_str);

    // Alerts first, the way the dashboard banners them.
    if data.alerts.is_empty() {
        println!("No active trade signals at the moment.");
    } else {
        for alert in &data.alerts {
            println!("ALERT: {}", alert.message);
        }
    }
    println!();

    match data.focus.status {
        ScanStatus::Complete => {
            let signals = &data.focus.signals;
            if let Some(rsi) = signals.rsi {
                println!("{symbol} RSI: {rsi:.2}");
            }
            if let (Some(support), Some(resistance)) = (signals.support, signals.resistance) {
                println!("{symbol} support/resistance: {support:.2} / {resistance:.2}");
            }
        }
        ScanStatus::Degraded => println!("{symbol}: no data this cycle."),
    }

    println!("\nBullish momentum (daily RSI):\n{}", momentum_table(data));

    if !data.news.is_empty() {
        println!("\nNews:");
        for item in &data.news {
            println!("  [{}] {}", item.label, item.title);
        }
    }
}

fn momentum_table(data: &RefreshData) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Rank").add_attribute(Attribute::Bold),
            Cell::new("Symbol").add_attribute(Attribute::Bold),
            Cell::new("RSI (1d)")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Right),
            Cell::new("Close")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Right),
            Cell::new("Volume")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Right),
        ]);

    let top_rsi = data
        .momentum
        .iter()
        .map(|e| e.rsi)
        .fold(f64::MIN, f64::max)
        .max(1.0);

    for (i, entry) in data.momentum.iter().enumerate() {
        let ratio = get_visibility_ratio(entry.rsi, top_rsi);
        let cyan_val = (255.0 * ratio) as u8;
        let green_val = (255.0 * ratio) as u8;

        table.add_row(vec![
            Cell::new(i + 1).fg(Color::DarkGrey),
            Cell::new(&entry.symbol).fg(Color::Rgb {
                r: 0,
                g: cyan_val,
                b: cyan_val,
            }),
            Cell::new(format!("{:.2}", entry.rsi))
                .fg(Color::Rgb {
                    r: 0,
                    g: green_val,
                    b: 0,
                })
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", entry.close)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.0}", entry.volume)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

fn get_visibility_ratio(current: f64, top: f64) -> f64 {
    let mut ratio = 0.4 + 0.6 * (current / top);
    if ratio < 0.4 {
        ratio = 0.4;
    }
    ratio
}

fn format_timestamp(ts_ms: i64) -> String {
    let seconds = ts_ms / 1000;
    let nanoseconds = ((ts_ms % 1000) * 1_000_000) as u32;

    if let Some(dt) = DateTime::from_timestamp(seconds, nanoseconds) {
        return dt.format("%d-%m-%Y %H:%M:%S").to_string();
    }
    "Unknown Time".to_string()
}
