//! The refresh cycle shared by both dashboard renderings.
//!
//! Runs the scan pipeline across the whole universe for alerts, keeps the
//! focused symbol's outcome for the signal panel, then adds the momentum
//! listing and news sentiment and dispatches any alerts. The sequence is
//! strictly sequential; a slow external call simply makes the refresh take
//! longer.

use crate::config::AppConfig;
use crate::market::BarFeed;
use crate::momentum::{self, MomentumEntry};
use crate::news::NewsFeed;
use crate::notify::Notifier;
use crate::scan::{Alert, ScanOutcome, ScanPipeline};
use crate::sentiment::{self, Classifier, SentimentResult};
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

/// Everything a refresh needs, wired once at startup.
pub struct RefreshContext {
    pub config: AppConfig,
    pub pipeline: ScanPipeline,
    pub feed: Arc<dyn BarFeed>,
    pub news: Option<Arc<dyn NewsFeed>>,
    pub classifier: Arc<dyn Classifier>,
    pub notifier: Arc<Notifier>,
}

/// One refresh worth of dashboard state.
#[derive(Debug, Clone)]
pub struct RefreshData {
    pub generated_at_ms: i64,
    /// Scan outcome for the symbol the dashboard is focused on.
    pub focus: ScanOutcome,
    /// Alerts raised anywhere in the universe scan, already dispatched.
    pub alerts: Vec<Alert>,
    pub momentum: Vec<MomentumEntry>,
    pub news: Vec<SentimentResult>,
}

/// Run the full refresh for one focused symbol:
/// 1. Scan the whole universe for signals and alerts.
/// 2. Run the bullish momentum listing over the universe.
/// 3. Fetch headlines for the focused symbol and annotate sentiment.
/// 4. Dispatch every alert through the notifier.
pub async fn run_refresh(ctx: &RefreshContext, symbol: &str) -> RefreshData {
    let mut outcomes = ctx.pipeline.run_universe(&ctx.config.universe).await;
    let alerts: Vec<Alert> = outcomes
        .iter()
        .flat_map(|outcome| outcome.alerts.clone())
        .collect();

    // The focused symbol is normally part of the universe; scan it on its
    // own when it is not.
    let focus = match outcomes.iter().position(|o| o.symbol == symbol) {
        Some(index) => outcomes.swap_remove(index),
        None => ctx.pipeline.run(symbol).await,
    };

    let momentum = momentum::bullish_momentum(
        ctx.feed.as_ref(),
        &ctx.config.universe,
        &ctx.config.thresholds,
        ctx.config.klines.limit,
    )
    .await;

    // News is best-effort annotation, never a hard dependency.
    let news_items = match &ctx.news {
        Some(feed) => feed.headlines(symbol).await.unwrap_or_else(|err| {
            warn!(symbol, error = %err, "news fetch failed, showing none");
            Vec::new()
        }),
        None => Vec::new(),
    };
    let news = sentiment::annotate(ctx.classifier.as_ref(), &news_items);

    for alert in &alerts {
        ctx.notifier.dispatch(alert).await;
    }

    RefreshData {
        generated_at_ms: Utc::now().timestamp_millis(),
        focus,
        alerts,
        momentum,
        news,
    }
}
