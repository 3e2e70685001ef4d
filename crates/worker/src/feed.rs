use anyhow::Context;
use pricetarget_core::ingest::feed::{fetch_all_pages, FeedClient};
use std::path::Path;

pub async fn fetch_feed_to_file(
    client: &dyn FeedClient,
    out: &Path,
    max_pages: Option<usize>,
) -> anyhow::Result<usize> {
    let records = fetch_all_pages(client, max_pages).await?;
    let body = serde_json::to_vec_pretty(&records).context("failed to encode feed records")?;
    std::fs::write(out, body)
        .with_context(|| format!("failed to write feed records to {}", out.display()))?;
    Ok(records.len())
}
