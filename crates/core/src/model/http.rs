use crate::model::ModelSource;
use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct HttpModelSource {
    http: reqwest::Client,
    url: String,
    retries: u32,
}

impl HttpModelSource {
    pub fn from_env(url: &str) -> Result<Self> {
        let timeout_secs = std::env::var("MODEL_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("MODEL_FETCH_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        Self::new(url, Duration::from_secs(timeout_secs), retries)
    }

    pub fn new(url: &str, timeout: Duration, retries: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build model http client")?;

        Ok(Self {
            http,
            url: url.to_string(),
            retries: retries.max(1),
        })
    }

    async fn fetch_once(&self) -> Result<Vec<u8>> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("model request failed")?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .context("failed to read model response")?;

        if !status.is_success() {
            anyhow::bail!(
                "model source HTTP {status}: {}",
                String::from_utf8_lossy(&body)
            );
        }
        Ok(body.to_vec())
    }
}

#[async_trait::async_trait]
impl ModelSource for HttpModelSource {
    fn describe(&self) -> String {
        format!("url {}", self.url)
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once().await {
                Ok(bytes) => return Ok(bytes),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err.context(format!(
                            "model fetch from {} failed after {attempt} attempts",
                            self.url
                        )));
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1).min(5));
                    tracing::warn!(attempt, ?backoff, error = %err, "model fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_are_at_least_one() {
        let source = HttpModelSource::new("http://localhost/model.json", Duration::from_secs(1), 0)
            .unwrap();
        assert_eq!(source.retries, 1);
    }

    #[tokio::test]
    async fn unreachable_host_fails_without_retrying_forever() {
        // Port 9 (discard) on loopback is closed in test environments.
        let source = HttpModelSource::new("http://127.0.0.1:9/model.json", Duration::from_secs(1), 1)
            .unwrap();
        let err = source.fetch_bytes().await.unwrap_err();
        assert!(format!("{err:#}").contains("after 1 attempts"));
    }
}
