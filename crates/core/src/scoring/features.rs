use crate::domain::model::{ClusterModel, FeatureVector, RawFeatures, FEATURE_COUNT};
use crate::domain::stock::StockRecord;
use crate::error::ScoringError;
use crate::scoring::vocab;
use chrono::{DateTime, Utc};

pub fn extract_raw_features(
    record: &StockRecord,
    now: DateTime<Utc>,
) -> Result<RawFeatures, ScoringError> {
    let from = parse_price("target_from", &record.target_from)?;
    let to = parse_price("target_to", &record.target_to)?;

    Ok(RawFeatures {
        target_delta: target_delta(&record.target_from, from, to)?,
        has_brokerage: if record.brokerage.is_empty() { 0.0 } else { 1.0 },
        action_score: f64::from(vocab::action_score(&record.action)?),
        rating_delta_score: vocab::rating_delta(&record.rating_from, &record.rating_to),
        time_delta: time_delta_days(&record.time, now)?,
    })
}

pub fn extract_features(
    record: &StockRecord,
    model: &ClusterModel,
    now: DateTime<Utc>,
) -> Result<FeatureVector, ScoringError> {
    let raw = extract_raw_features(record, now)?;
    Ok(standardize(raw.to_array(), model.means(), model.stds()))
}

/// Accepts plain decimals and the feed's money format (`"$1,020.00"`).
pub fn parse_price(field: &'static str, text: &str) -> Result<f64, ScoringError> {
    let trimmed = text.trim();
    let unprefixed = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let cleaned: String = unprefixed.chars().filter(|c| *c != ',').collect();

    let parse_err = |reason: String| ScoringError::Parse {
        field,
        value: text.to_string(),
        reason,
    };

    let value = cleaned
        .parse::<f64>()
        .map_err(|e| parse_err(e.to_string()))?;
    if !value.is_finite() {
        return Err(parse_err("price must be a finite number".to_string()));
    }
    Ok(value)
}

pub fn target_delta(from_text: &str, from: f64, to: f64) -> Result<f64, ScoringError> {
    let delta = ((to - from) / from) * 100.0;
    if from == 0.0 || !delta.is_finite() {
        return Err(ScoringError::DivisionByZero {
            field: "target_from",
            value: from_text.to_string(),
        });
    }
    Ok(delta)
}

pub fn time_delta_days(timestamp: &str, now: DateTime<Utc>) -> Result<f64, ScoringError> {
    let ts = DateTime::parse_from_rfc3339(timestamp.trim()).map_err(|e| ScoringError::Parse {
        field: "time",
        value: timestamp.to_string(),
        reason: e.to_string(),
    })?;

    let elapsed = now.signed_duration_since(ts);
    let hours = elapsed.num_milliseconds() as f64 / 3_600_000.0;
    Ok((hours / 24.0).round())
}

// std == 0 maps to 0.
pub fn standardize_value(x: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 {
        return 0.0;
    }
    (x - mean) / std
}

pub fn standardize(
    values: [f64; FEATURE_COUNT],
    means: &[f64; FEATURE_COUNT],
    stds: &[f64; FEATURE_COUNT],
) -> FeatureVector {
    let mut out = [0.0; FEATURE_COUNT];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = standardize_value(values[i], means[i], stds[i]);
    }
    FeatureVector(out)
}
