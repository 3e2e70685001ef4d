use anyhow::Context;
use chrono::{DateTime, Utc};
use pricetarget_core::domain::model::ClusterModel;
use pricetarget_core::domain::stock::StockRecord;
use pricetarget_core::scoring::clock::{Clock, FixedClock, SystemClock};
use pricetarget_core::scoring::{Recommendation, Recommender};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

pub fn read_record(path: &Path) -> anyhow::Result<StockRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read record file {}", path.display()))?;
    serde_json::from_str::<StockRecord>(&text)
        .with_context(|| format!("record file {} is not a stock record", path.display()))
}

pub fn clock_for(now_arg: Option<&str>) -> anyhow::Result<Arc<dyn Clock>> {
    let Some(s) = now_arg else {
        return Ok(Arc::new(SystemClock));
    };
    let now = DateTime::parse_from_rfc3339(s.trim())
        .with_context(|| format!("--now must be RFC 3339 (got {s:?})"))?
        .with_timezone(&Utc);
    Ok(Arc::new(FixedClock(now)))
}

pub fn score_record(
    model: Arc<ClusterModel>,
    clock: Arc<dyn Clock>,
    record: &StockRecord,
) -> anyhow::Result<Recommendation> {
    let recommender = Recommender::with_clock(model, clock);
    recommender
        .recommend(record)
        .with_context(|| format!("failed to score {} (id={})", record.ticker, record.id))
}

pub fn render(record: &StockRecord, rec: &Recommendation) -> serde_json::Value {
    json!({
        "ticker": record.ticker,
        "id": record.id,
        "cluster": rec.cluster,
        "predicted_target_delta": rec.predicted_target_delta,
        "raw_features": rec.raw_features,
        "features": rec.features,
    })
}
