//! Error types shared across the fetch and classification seams.
//!
//! Every failure here has a silent-degradation path somewhere upstream:
//! fetch errors become empty results, classification errors become Neutral
//! labels. Nothing in this crate treats these as fatal.

use thiserror::Error;

/// Failure modes of an external data feed (market bars or news).
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("unexpected http status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Failure of a single sentiment classification call.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no scorable tokens in input")]
    EmptyInput,
}
