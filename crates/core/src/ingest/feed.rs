use crate::config::Settings;
use crate::domain::stock::StockRecord;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;

/// One page of the analyst price-target feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub items: Vec<StockRecord>,
    #[serde(default)]
    pub next_page: Option<String>,
}

pub fn parse_page(text: &str) -> Result<FeedPage> {
    serde_json::from_str::<FeedPage>(text)
        .with_context(|| format!("feed response is not a valid page: {text}"))
}

#[async_trait::async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch_page(&self, next_page: Option<&str>) -> Result<FeedPage>;
}

#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    http: reqwest::Client,
    url: String,
    token: String,
    retries: u32,
}

impl HttpFeedClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let url = settings.require_feed_url()?.to_string();
        let token = settings.require_feed_token()?.trim().to_string();

        let timeout_secs = std::env::var("FEED_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("FEED_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build feed http client")?;

        Ok(Self {
            http,
            url,
            token,
            retries: retries.max(1),
        })
    }

    async fn fetch_once(&self, next_page: Option<&str>) -> Result<FeedPage> {
        let mut req = self.http.get(&self.url).bearer_auth(&self.token);
        if let Some(cursor) = next_page {
            req = req.query(&[("next_page", cursor)]);
        }

        let res = req.send().await.context("feed request failed")?;
        let status = res.status();
        let text = res.text().await.context("failed to read feed response")?;

        if !status.is_success() {
            anyhow::bail!("feed HTTP {status}: {text}");
        }
        parse_page(&text)
    }
}

#[async_trait::async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch_page(&self, next_page: Option<&str>) -> Result<FeedPage> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(next_page).await {
                Ok(page) => return Ok(page),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1).min(5));
                    tracing::warn!(attempt, ?backoff, error = %err, "feed fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// Follows `next_page` cursors until the feed stops returning one, flattening every page's items.
pub async fn fetch_all_pages(
    client: &dyn FeedClient,
    max_pages: Option<usize>,
) -> Result<Vec<StockRecord>> {
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages: usize = 0;

    loop {
        let page = client
            .fetch_page(cursor.as_deref())
            .await
            .with_context(|| format!("failed to fetch feed page {pages} (cursor={cursor:?})"))?;
        pages += 1;

        tracing::debug!(
            page = pages,
            items = page.items.len(),
            next_page = ?page.next_page,
            "fetched feed page"
        );
        records.extend(page.items);

        let next = page.next_page.filter(|s| !s.trim().is_empty());
        let Some(next) = next else {
            break;
        };
        anyhow::ensure!(
            cursor.as_deref() != Some(next.as_str()),
            "feed returned the same next_page cursor twice: {next}"
        );
        if max_pages.is_some_and(|max| pages >= max) {
            tracing::info!(pages, "feed page limit reached");
            break;
        }
        cursor = Some(next);
    }

    tracing::info!(pages, records = records.len(), "feed fetch complete");
    Ok(records)
}
