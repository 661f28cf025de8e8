//! Application configuration, resolved once at process start.
//!
//! Settings come from a JSON file (`STOCK_SENTRY_CONFIG`, default
//! `config.json`). Channel secrets are never part of the file; they are
//! injected from the environment and wrapped in `SecretString`.

use anyhow::Context;
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Ordered symbol universe. Scans preserve this order.
    pub universe: Vec<String>,
    pub market: MarketConfig,
    #[serde(default)]
    pub news: Option<NewsConfig>,
    #[serde(default)]
    pub klines: KlineConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Seconds between automatic refreshes; 0 means manual only.
    #[serde(default)]
    pub refresh_secs: u64,
    #[serde(default)]
    pub display: DisplayMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KlineConfig {
    #[serde(default = "default_interval")]
    pub interval: String, // e.g., "15m", "1h", "1d"
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for KlineConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            limit: default_limit(),
        }
    }
}

/// Scan thresholds. The 20x volume multiplier and RSI 60 bullish cutoff are
/// inherited defaults, kept configurable rather than baked in.
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_rsi_bullish")]
    pub rsi_bullish: f64,
    #[serde(default = "default_volume_multiplier")]
    pub volume_spike_multiplier: f64,
    #[serde(default = "default_sr_window")]
    pub support_resistance_window: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            rsi_bullish: default_rsi_bullish(),
            volume_spike_multiplier: default_volume_multiplier(),
            support_resistance_window: default_sr_window(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub sms: Option<SmsConfig>,
}

/// Email gateway endpoint plus addressing. The bearer token comes from
/// `STOCK_SENTRY_EMAIL_TOKEN`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub endpoint: String,
    pub from: String,
    pub to: String,
}

/// SMS gateway endpoint plus destination number. The bearer token comes
/// from `STOCK_SENTRY_SMS_TOKEN`.
#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    pub endpoint: String,
    pub to: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Tui,
    Plain,
}

fn default_interval() -> String {
    "1h".to_string()
}

fn default_limit() -> u32 {
    200
}

fn default_rsi_period() -> usize {
    14
}

fn default_rsi_bullish() -> f64 {
    60.0
}

fn default_volume_multiplier() -> f64 {
    20.0
}

fn default_sr_window() -> usize {
    20
}

/// Load the config file named by `STOCK_SENTRY_CONFIG` (default
/// `config.json` in the working directory).
pub async fn load() -> anyhow::Result<AppConfig> {
    let path =
        std::env::var("STOCK_SENTRY_CONFIG").unwrap_or_else(|_| "config.json".to_string());

    let content = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading config file {path}"))?;
    let config: AppConfig =
        serde_json::from_slice(&content).with_context(|| format!("parsing config file {path}"))?;

    if config.universe.is_empty() {
        anyhow::bail!("config universe must name at least one symbol");
    }
    Ok(config)
}

/// Read a secret from the environment. Empty values count as unset.
pub fn env_secret(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}
