//! News headlines for a symbol, capped at five per fetch.

use crate::error::FeedError;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

pub const MAX_HEADLINES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
}

#[async_trait]
pub trait NewsFeed: Send + Sync {
    async fn headlines(&self, symbol: &str) -> Result<Vec<NewsItem>, FeedError>;
}

/// Company-news endpoint client. The feed reports typed errors; callers
/// degrade to an empty list.
pub struct HttpNewsFeed {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpNewsFeed {
    pub fn new(client: Client, base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token,
        }
    }
}

#[derive(Deserialize)]
struct NewsRow {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    summary: String,
}

#[async_trait]
impl NewsFeed for HttpNewsFeed {
    async fn headlines(&self, symbol: &str) -> Result<Vec<NewsItem>, FeedError> {
        let url = format!("{}/company-news", self.base_url);
        let mut request = self.client.get(&url).query(&[("symbol", symbol)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let rows: Vec<NewsRow> = response
            .json()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))?;

        let items = rows
            .into_iter()
            .filter(|row| !row.headline.trim().is_empty())
            .map(|row| NewsItem {
                title: row.headline,
                description: row.summary,
            })
            .take(MAX_HEADLINES)
            .collect();

        Ok(items)
    }
}
