//! Bullish momentum listing: symbols whose latest daily RSI clears the
//! configured threshold.

use crate::config::ThresholdConfig;
use crate::indicators;
use crate::market::BarFeed;
use tracing::debug;

/// The momentum scan always reads daily bars regardless of the dashboard's
/// configured chart interval.
const DAILY_INTERVAL: &str = "1d";

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumEntry {
    pub symbol: String,
    pub rsi: f64,
    pub close: f64,
    pub volume: f64,
}

/// Filter the universe down to symbols with daily RSI strictly above the
/// bullish threshold, annotated with last close and volume. Per-symbol
/// failures are skipped; relative universe order is preserved.
pub async fn bullish_momentum(
    feed: &dyn BarFeed,
    universe: &[String],
    thresholds: &ThresholdConfig,
    limit: u32,
) -> Vec<MomentumEntry> {
    let mut entries = Vec::new();

    for symbol in universe {
        let series = match feed.fetch(symbol, DAILY_INTERVAL, limit).await {
            Ok(series) => series,
            Err(err) => {
                debug!(%symbol, error = %err, "daily fetch failed, skipping symbol");
                continue;
            }
        };

        let Some(rsi) = indicators::latest_rsi(&series.closes(), thresholds.rsi_period) else {
            debug!(%symbol, bars = series.len(), "not enough bars for RSI, skipping");
            continue;
        };
        if rsi <= thresholds.rsi_bullish {
            continue;
        }
        let Some(last) = series.last() else { continue };

        entries.push(MomentumEntry {
            symbol: symbol.clone(),
            rsi,
            close: last.close,
            volume: last.volume,
        });
    }

    entries
}
