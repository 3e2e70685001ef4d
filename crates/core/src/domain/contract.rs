use crate::domain::model::{Centroid, ClusterModel, FEATURE_COUNT};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelContract {
    pub k: usize,
    pub features: Vec<String>,
    pub centroids: Vec<Vec<f64>>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    #[serde(default)]
    pub avg_target_deltas: Option<Vec<f64>>,
}

macro_rules! ensure_consistent {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(ModelError::Inconsistent(format!($($arg)+)));
        }
    };
}

impl ModelContract {
    pub fn validate_and_into_model(self) -> Result<ClusterModel, ModelError> {
        ensure_consistent!(self.k >= 1, "k must be at least 1 (got {})", self.k);
        ensure_consistent!(
            self.features.len() == FEATURE_COUNT,
            "expected {FEATURE_COUNT} features (got {})",
            self.features.len()
        );
        ensure_consistent!(
            self.centroids.len() == self.k,
            "k is {} but {} centroids were supplied",
            self.k,
            self.centroids.len()
        );

        let mut centroids = Vec::with_capacity(self.centroids.len());
        for (idx, row) in self.centroids.iter().enumerate() {
            ensure_consistent!(
                row.len() == self.features.len(),
                "centroid {idx} has {} values, expected {}",
                row.len(),
                self.features.len()
            );
            centroids.push(finite_row("centroid", Some(idx), row)?);
        }

        ensure_consistent!(
            self.means.len() == self.features.len(),
            "means has {} values, expected {}",
            self.means.len(),
            self.features.len()
        );
        ensure_consistent!(
            self.stds.len() == self.features.len(),
            "stds has {} values, expected {}",
            self.stds.len(),
            self.features.len()
        );
        let means = finite_row("means", None, &self.means)?;
        let stds = finite_row("stds", None, &self.stds)?;
        if let Some(idx) = stds.iter().position(|s| *s < 0.0) {
            return Err(ModelError::Inconsistent(format!(
                "stds[{idx}] is negative ({})",
                stds[idx]
            )));
        }

        if let Some(outcomes) = &self.avg_target_deltas {
            ensure_consistent!(
                outcomes.len() == self.k,
                "avg_target_deltas has {} values, expected k={}",
                outcomes.len(),
                self.k
            );
            if let Some(idx) = outcomes.iter().position(|v| !v.is_finite()) {
                return Err(ModelError::Inconsistent(format!(
                    "avg_target_deltas[{idx}] is not finite"
                )));
            }
        }

        let feature_names: [String; FEATURE_COUNT] = self
            .features
            .try_into()
            .map_err(|_| ModelError::Inconsistent("feature count changed".to_string()))?;

        Ok(ClusterModel {
            feature_names,
            centroids,
            means,
            stds,
            avg_outcomes: self.avg_target_deltas,
        })
    }
}

fn finite_row(name: &str, idx: Option<usize>, row: &[f64]) -> Result<Centroid, ModelError> {
    let label = match idx {
        Some(i) => format!("{name} {i}"),
        None => name.to_string(),
    };
    if let Some(pos) = row.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::Inconsistent(format!(
            "{label} has a non-finite value at position {pos}"
        )));
    }
    row.try_into().map_err(|_| {
        ModelError::Inconsistent(format!(
            "{label} has {} values, expected {FEATURE_COUNT}",
            row.len()
        ))
    })
}
