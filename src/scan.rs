//! Per-symbol scan pipeline: bars in, signals and alerts out.
//!
//! A fetch failure or a too-short series degrades to an empty signal set
//! with zero alerts. The degradation is carried in the outcome status so
//! callers and tests can see the skip instead of inferring it.

use crate::config::{KlineConfig, ThresholdConfig};
use crate::indicators::{self, VolumeCheck};
use crate::market::BarFeed;
use crate::patterns::{self, PatternHit};
use std::sync::Arc;
use tracing::debug;

/// Everything derived from one BarSeries. Stateless, recomputed per scan.
#[derive(Debug, Clone, Default)]
pub struct SignalSet {
    pub patterns: Vec<PatternHit>,
    pub rsi: Option<f64>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub volume: Option<VolumeCheck>,
}

impl SignalSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
            && self.rsi.is_none()
            && self.support.is_none()
            && self.resistance.is_none()
            && self.volume.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertKind {
    Pattern,
    VolumeSpike,
}

/// One alert-worthy condition, consumed once by the notifier.
#[derive(Debug, Clone)]
pub struct Alert {
    pub symbol: String,
    pub kind: AlertKind,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanStatus {
    Complete,
    /// Fetch failed or returned fewer than 2 bars; signals are empty.
    Degraded,
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub symbol: String,
    pub status: ScanStatus,
    pub signals: SignalSet,
    pub alerts: Vec<Alert>,
    /// Close sequence kept for chart rendering only.
    pub closes: Vec<f64>,
}

impl ScanOutcome {
    fn degraded(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            status: ScanStatus::Degraded,
            signals: SignalSet::empty(),
            alerts: Vec::new(),
            closes: Vec::new(),
        }
    }
}

pub struct ScanPipeline {
    feed: Arc<dyn BarFeed>,
    klines: KlineConfig,
    thresholds: ThresholdConfig,
}

impl ScanPipeline {
    pub fn new(feed: Arc<dyn BarFeed>, klines: KlineConfig, thresholds: ThresholdConfig) -> Self {
        Self {
            feed,
            klines,
            thresholds,
        }
    }

    /// Scan one symbol. Never fails; fetch problems and short series come
    /// back as a `Degraded` outcome.
    pub async fn run(&self, symbol: &str) -> ScanOutcome {
        let series = match self
            .feed
            .fetch(symbol, &self.klines.interval, self.klines.limit)
            .await
        {
            Ok(series) => series,
            Err(err) => {
                debug!(symbol, error = %err, "bar fetch failed, skipping symbol");
                return ScanOutcome::degraded(symbol);
            }
        };

        if series.len() < 2 {
            debug!(symbol, bars = series.len(), "too few bars, skipping symbol");
            return ScanOutcome::degraded(symbol);
        }

        let closes = series.closes();
        let (support, resistance) = indicators::support_resistance(
            &series,
            self.thresholds.support_resistance_window,
        )
        .map_or((None, None), |(s, r)| (Some(s), Some(r)));

        let signals = SignalSet {
            patterns: patterns::detect_all(&series),
            rsi: indicators::latest_rsi(&closes, self.thresholds.rsi_period),
            support,
            resistance,
            volume: indicators::volume_spike(
                &series.volumes(),
                self.thresholds.volume_spike_multiplier,
            ),
        };

        let alerts = build_alerts(symbol, &signals);

        ScanOutcome {
            symbol: symbol.to_string(),
            status: ScanStatus::Complete,
            signals,
            alerts,
            closes,
        }
    }

    /// Scan a symbol universe one symbol at a time. A failing symbol
    /// degrades alone; output preserves input order.
    pub async fn run_universe(&self, symbols: &[String]) -> Vec<ScanOutcome> {
        let mut outcomes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            outcomes.push(self.run(symbol).await);
        }
        outcomes
    }
}

/// At most one Pattern alert naming every detected pattern, and at most one
/// VolumeSpike alert with the current/average pair. RSI never alerts here.
fn build_alerts(symbol: &str, signals: &SignalSet) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if !signals.patterns.is_empty() {
        let names: Vec<String> = signals
            .patterns
            .iter()
            .map(|hit| {
                let side = if hit.is_bullish() { "bullish" } else { "bearish" };
                format!("{} ({side})", hit.name)
            })
            .collect();
        alerts.push(Alert {
            symbol: symbol.to_string(),
            kind: AlertKind::Pattern,
            subject: format!("Pattern alert: {symbol}"),
            message: format!("{symbol} printed {} on the last bar", names.join(", ")),
        });
    }

    if let Some(volume) = &signals.volume {
        if volume.spiked {
            alerts.push(Alert {
                symbol: symbol.to_string(),
                kind: AlertKind::VolumeSpike,
                subject: format!("Volume spike: {symbol}"),
                message: format!(
                    "{symbol} traded {:.0} against a {:.0} average",
                    volume.current, volume.average
                ),
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bars::{Bar, BarSeries};
    use crate::error::FeedError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Feed serving canned series; unknown symbols fail the fetch.
    struct FakeFeed {
        series: HashMap<String, Vec<Bar>>,
    }

    #[async_trait]
    impl BarFeed for FakeFeed {
        async fn fetch(
            &self,
            symbol: &str,
            _interval: &str,
            _limit: u32,
        ) -> Result<BarSeries, FeedError> {
            match self.series.get(symbol) {
                Some(bars) => Ok(BarSeries::from_bars(symbol, bars.clone())),
                None => Err(FeedError::Malformed("no such symbol".to_string())),
            }
        }
    }

    fn flat_bar(ts: i64, price: f64, volume: f64) -> Bar {
        Bar {
            timestamp_ms: ts,
            open: price,
            high: price + 1.0,
            low: price - 1.0,
            close: price,
            volume,
        }
    }

    fn pipeline(series: HashMap<String, Vec<Bar>>) -> ScanPipeline {
        ScanPipeline::new(
            Arc::new(FakeFeed { series }),
            KlineConfig::default(),
            ThresholdConfig::default(),
        )
    }

    #[tokio::test]
    async fn short_series_degrades_to_empty() {
        let mut series = HashMap::new();
        series.insert("ONE".to_string(), vec![flat_bar(0, 100.0, 10.0)]);
        let outcome = pipeline(series).run("ONE").await;
        assert_eq!(outcome.status, ScanStatus::Degraded);
        assert!(outcome.signals.is_empty());
        assert!(outcome.alerts.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_degrades_to_empty() {
        let outcome = pipeline(HashMap::new()).run("MISSING").await;
        assert_eq!(outcome.status, ScanStatus::Degraded);
        assert!(outcome.signals.is_empty());
        assert!(outcome.alerts.is_empty());
    }

    #[tokio::test]
    async fn volume_spike_emits_one_alert() {
        // Prior volumes average 40; the last bar trades 1000, far past 20x.
        let mut bars: Vec<Bar> = (0..10).map(|i| flat_bar(i, 100.0, 40.0)).collect();
        bars.push(flat_bar(10, 100.0, 1000.0));
        let mut series = HashMap::new();
        series.insert("SPIKY".to_string(), bars);

        let outcome = pipeline(series).run("SPIKY").await;
        assert_eq!(outcome.status, ScanStatus::Complete);

        let volume = outcome.signals.volume.unwrap();
        assert!(volume.spiked);
        assert_eq!(volume.current, 1000.0);
        assert_eq!(volume.average, 40.0);

        let spikes: Vec<&Alert> = outcome
            .alerts
            .iter()
            .filter(|a| a.kind == AlertKind::VolumeSpike)
            .collect();
        assert_eq!(spikes.len(), 1);
        assert!(spikes[0].message.contains("1000"));
        assert!(spikes[0].message.contains("40"));
    }

    #[tokio::test]
    async fn failing_symbol_does_not_abort_universe() {
        let mut series = HashMap::new();
        series.insert(
            "GOOD".to_string(),
            (0..10).map(|i| flat_bar(i, 100.0, 40.0)).collect(),
        );
        let universe = vec!["GOOD".to_string(), "BAD".to_string(), "GOOD".to_string()];

        let outcomes = pipeline(series).run_universe(&universe).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].status, ScanStatus::Complete);
        assert_eq!(outcomes[1].status, ScanStatus::Degraded);
        assert_eq!(outcomes[2].status, ScanStatus::Complete);
    }
}
