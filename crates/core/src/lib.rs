pub mod domain;
pub mod error;
pub mod ingest;
pub mod model;
pub mod scoring;
pub mod storage;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub centroids_path: Option<String>,
        pub sentry_dsn: Option<String>,
        pub cors_allowed_origins: Option<String>,
        pub feed_url: Option<String>,
        pub feed_token: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                centroids_path: std::env::var("CENTROIDS_PATH")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS").ok(),
                feed_url: std::env::var("FEED_URL").ok(),
                feed_token: std::env::var("FEED_TOKEN").ok(),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_centroids_path(&self) -> anyhow::Result<&str> {
            self.centroids_path
                .as_deref()
                .context("CENTROIDS_PATH is required")
        }

        pub fn require_feed_url(&self) -> anyhow::Result<&str> {
            self.feed_url.as_deref().context("FEED_URL is required")
        }

        pub fn require_feed_token(&self) -> anyhow::Result<&str> {
            self.feed_token
                .as_deref()
                .context("FEED_TOKEN is required")
        }

        // None means any origin.
        pub fn cors_origins(&self) -> Option<Vec<String>> {
            let raw = self.cors_allowed_origins.as_deref()?.trim();
            if raw.is_empty() || raw == "*" {
                return None;
            }
            let origins: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        }
    }

}
