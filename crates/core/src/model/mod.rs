pub mod file;
pub mod http;
pub mod json;

use crate::config::Settings;
use crate::domain::model::{ClusterModel, FEATURE_NAMES};
use anyhow::Context;

pub use file::FileModelSource;
pub use http::HttpModelSource;

#[async_trait::async_trait]
pub trait ModelSource: Send + Sync {
    fn describe(&self) -> String;

    async fn fetch_bytes(&self) -> anyhow::Result<Vec<u8>>;
}

/// `http(s)://` URLs are fetched; anything else is a file path.
pub fn source_from_location(location: &str) -> anyhow::Result<Box<dyn ModelSource>> {
    let location = location.trim();
    anyhow::ensure!(!location.is_empty(), "model location must be non-empty");

    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpModelSource::from_env(location)?))
    } else {
        Ok(Box::new(FileModelSource::new(location)))
    }
}

pub fn source_from_settings(settings: &Settings) -> anyhow::Result<Box<dyn ModelSource>> {
    source_from_location(settings.require_centroids_path()?)
}

pub async fn load_model(source: &dyn ModelSource) -> anyhow::Result<ClusterModel> {
    let bytes = source.fetch_bytes().await?;
    let model = json::parse_model(&bytes)
        .with_context(|| format!("failed to load cluster model from {}", source.describe()))?;

    if !model.has_canonical_feature_names() {
        tracing::warn!(
            features = ?model.feature_names(),
            expected = ?FEATURE_NAMES,
            "model feature names differ from the extractor's order"
        );
    }

    tracing::info!(
        source = %source.describe(),
        k = model.k(),
        features = ?model.feature_names(),
        has_outcomes = model.avg_outcomes().is_some(),
        "loaded cluster model"
    );
    Ok(model)
}
