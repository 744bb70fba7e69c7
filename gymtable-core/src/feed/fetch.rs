//! HTTP retrieval of calendar feeds.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{GymTableError, GymTableResult};

/// Bounded per-request timeout so a single unreachable feed cannot stall a
/// whole ingestion round. A timeout is an ordinary fetch failure.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Retrieves raw feed content for one URL.
///
/// The ingestion pipeline only depends on this trait, so tests substitute
/// canned feed documents for the network.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> GymTableResult<String>;
}

/// [`FeedFetcher`] over a shared reqwest client.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> GymTableResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GymTableError::FeedFetch(e.to_string()))?;
        Ok(HttpFeedFetcher { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> GymTableResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GymTableError::FeedFetch(format!("{url}: {e}")))?
            .error_for_status()
            .map_err(|e| GymTableError::FeedFetch(format!("{url}: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| GymTableError::FeedFetch(format!("{url}: {e}")))
    }
}
