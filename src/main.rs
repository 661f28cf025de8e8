use std::sync::Arc;

use stock_sentry::config::{self, DisplayMode};
use stock_sentry::market::HttpBarFeed;
use stock_sentry::news::{HttpNewsFeed, NewsFeed};
use stock_sentry::notify::{EmailChannel, Notifier, SmsChannel};
use stock_sentry::refresh::RefreshContext;
use stock_sentry::scan::ScanPipeline;
use stock_sentry::sentiment::LexiconClassifier;
use stock_sentry::{plain, tui};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stock_sentry=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::load().await?;
    let client = reqwest::Client::builder().build()?;

    let feed: Arc<dyn stock_sentry::market::BarFeed> = Arc::new(HttpBarFeed::new(
        client.clone(),
        config.market.base_url.clone(),
    ));

    let news: Option<Arc<dyn NewsFeed>> = config.news.as_ref().map(|news_config| {
        Arc::new(HttpNewsFeed::new(
            client.clone(),
            news_config.base_url.clone(),
            config::env_secret("STOCK_SENTRY_NEWS_TOKEN"),
        )) as Arc<dyn NewsFeed>
    });

    let email = config.notify.email.as_ref().map(|c| EmailChannel {
        endpoint: c.endpoint.clone(),
        from: c.from.clone(),
        to: c.to.clone(),
        token: config::env_secret("STOCK_SENTRY_EMAIL_TOKEN"),
    });
    let sms = config.notify.sms.as_ref().map(|c| SmsChannel {
        endpoint: c.endpoint.clone(),
        to: c.to.clone(),
        token: config::env_secret("STOCK_SENTRY_SMS_TOKEN"),
    });
    let notifier = Arc::new(Notifier::new(client.clone(), email, sms));

    let pipeline = ScanPipeline::new(
        Arc::clone(&feed),
        config.klines.clone(),
        config.thresholds.clone(),
    );

    let display = config.display;
    let ctx = Arc::new(RefreshContext {
        config,
        pipeline,
        feed,
        news,
        classifier: Arc::new(LexiconClassifier::new()),
        notifier,
    });

    match display {
        DisplayMode::Tui => tui::run_tui(ctx).await,
        DisplayMode::Plain => plain::run(ctx).await,
    }
}
