//! End-to-end refresh cycle against fake feeds: focused scan, momentum
//! listing, news sentiment, alert production.

use async_trait::async_trait;
use std::sync::Arc;

use stock_sentry::bars::{Bar, BarSeries};
use stock_sentry::config::{
    AppConfig, DisplayMode, KlineConfig, MarketConfig, NotifyConfig, ThresholdConfig,
};
use stock_sentry::error::FeedError;
use stock_sentry::market::BarFeed;
use stock_sentry::news::{NewsFeed, NewsItem};
use stock_sentry::notify::Notifier;
use stock_sentry::refresh::{RefreshContext, run_refresh};
use stock_sentry::scan::{AlertKind, ScanPipeline, ScanStatus};
use stock_sentry::sentiment::{LexiconClassifier, SentimentLabel};

fn bar(ts: i64, close: f64, volume: f64) -> Bar {
    Bar {
        timestamp_ms: ts,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume,
    }
}

/// Daily requests serve a rising series for bullish symbols and a falling
/// one otherwise; chart-interval requests serve a volume-spike tape for the
/// focused symbol. Symbols named "DEAD" fail every fetch.
struct ScriptedFeed {
    bullish_daily: Vec<String>,
}

#[async_trait]
impl BarFeed for ScriptedFeed {
    async fn fetch(
        &self,
        symbol: &str,
        interval: &str,
        _limit: u32,
    ) -> Result<BarSeries, FeedError> {
        if symbol == "DEAD" {
            return Err(FeedError::Malformed("scripted failure".to_string()));
        }

        if interval == "1d" {
            let rising = self.bullish_daily.iter().any(|s| s == symbol);
            let bars = (0..40)
                .map(|i| {
                    let step = i as f64;
                    let close = if rising { 100.0 + step } else { 100.0 - step };
                    bar(i, close, 500.0)
                })
                .collect();
            return Ok(BarSeries::from_bars(symbol, bars));
        }

        // Chart interval: flat tape averaging 40 volume, then a 1000 print.
        let mut bars: Vec<Bar> = (0..20).map(|i| bar(i, 100.0, 40.0)).collect();
        bars.push(bar(20, 100.0, 1000.0));
        Ok(BarSeries::from_bars(symbol, bars))
    }
}

struct CannedNews;

#[async_trait]
impl NewsFeed for CannedNews {
    async fn headlines(&self, _symbol: &str) -> Result<Vec<NewsItem>, FeedError> {
        Ok(vec![
            NewsItem {
                title: "Shares surge on record profit".to_string(),
                description: "Earnings beat expectations".to_string(),
            },
            NewsItem {
                title: "1000".to_string(),
                description: String::new(),
            },
        ])
    }
}

struct DeadNews;

#[async_trait]
impl NewsFeed for DeadNews {
    async fn headlines(&self, _symbol: &str) -> Result<Vec<NewsItem>, FeedError> {
        Err(FeedError::Malformed("scripted outage".to_string()))
    }
}

fn test_config(universe: &[&str]) -> AppConfig {
    AppConfig {
        universe: universe.iter().map(|s| s.to_string()).collect(),
        market: MarketConfig {
            base_url: "http://unused.test".to_string(),
        },
        news: None,
        klines: KlineConfig::default(),
        thresholds: ThresholdConfig::default(),
        notify: NotifyConfig::default(),
        refresh_secs: 0,
        display: DisplayMode::Plain,
    }
}

fn context(
    universe: &[&str],
    feed: Arc<dyn BarFeed>,
    news: Option<Arc<dyn NewsFeed>>,
) -> RefreshContext {
    let config = test_config(universe);
    let pipeline = ScanPipeline::new(
        Arc::clone(&feed),
        config.klines.clone(),
        config.thresholds.clone(),
    );
    RefreshContext {
        config,
        pipeline,
        feed,
        news,
        classifier: Arc::new(LexiconClassifier::new()),
        notifier: Arc::new(Notifier::new(reqwest::Client::new(), None, None)),
    }
}

#[tokio::test]
async fn momentum_keeps_bullish_symbols_in_order() {
    let feed = Arc::new(ScriptedFeed {
        bullish_daily: vec!["A".to_string(), "C".to_string()],
    });
    let ctx = context(&["A", "B", "C"], feed, None);

    let data = run_refresh(&ctx, "A").await;

    let symbols: Vec<&str> = data.momentum.iter().map(|e| e.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["A", "C"]);
}

#[tokio::test]
async fn volume_spike_reaches_the_alert_list() {
    let feed = Arc::new(ScriptedFeed {
        bullish_daily: Vec::new(),
    });
    let ctx = context(&["SPIKY"], feed, None);

    let data = run_refresh(&ctx, "SPIKY").await;

    assert_eq!(data.focus.status, ScanStatus::Complete);
    let volume = data.focus.signals.volume.expect("volume check present");
    assert!(volume.spiked);
    assert_eq!(volume.current, 1000.0);
    assert_eq!(volume.average, 40.0);

    assert!(data.alerts.iter().any(|a| a.kind == AlertKind::VolumeSpike));
}

#[tokio::test]
async fn dead_focus_symbol_still_produces_a_frame() {
    let feed = Arc::new(ScriptedFeed {
        bullish_daily: vec!["A".to_string()],
    });
    let ctx = context(&["DEAD", "A"], feed, None);

    let data = run_refresh(&ctx, "DEAD").await;

    assert_eq!(data.focus.status, ScanStatus::Degraded);
    assert!(data.focus.alerts.is_empty());
    // The universe scan still ran around the dead symbol; every alert that
    // survived belongs to the healthy one.
    assert!(!data.alerts.is_empty());
    assert!(data.alerts.iter().all(|a| a.symbol == "A"));
    assert_eq!(data.momentum.len(), 1);
    assert_eq!(data.momentum[0].symbol, "A");
}

#[tokio::test]
async fn news_sentiment_annotates_and_degrades_per_item() {
    let feed = Arc::new(ScriptedFeed {
        bullish_daily: Vec::new(),
    });
    let ctx = context(&["X"], feed, Some(Arc::new(CannedNews)));

    let data = run_refresh(&ctx, "X").await;

    assert_eq!(data.news.len(), 2);
    assert_eq!(data.news[0].label, SentimentLabel::Positive);
    // The numeric-only headline fails classification and lands Neutral.
    assert_eq!(data.news[1].label, SentimentLabel::Neutral);
}

#[tokio::test]
async fn news_outage_degrades_to_empty() {
    let feed = Arc::new(ScriptedFeed {
        bullish_daily: Vec::new(),
    });
    let ctx = context(&["X"], feed, Some(Arc::new(DeadNews)));

    let data = run_refresh(&ctx, "X").await;
    assert!(data.news.is_empty());
}
