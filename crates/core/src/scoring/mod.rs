pub mod clock;
pub mod features;
pub mod matcher;
pub mod vocab;

use crate::domain::model::{ClusterModel, FeatureVector, Prediction, RawFeatures};
use crate::domain::stock::StockRecord;
use crate::error::ScoringError;
use clock::{Clock, SystemClock};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub raw_features: RawFeatures,
    pub features: FeatureVector,
    pub cluster: usize,
    pub predicted_target_delta: Option<f64>,
}

#[derive(Clone)]
pub struct Recommender {
    model: Arc<ClusterModel>,
    clock: Arc<dyn Clock>,
}

impl Recommender {
    pub fn new(model: Arc<ClusterModel>) -> Self {
        Self::with_clock(model, Arc::new(SystemClock))
    }

    pub fn with_clock(model: Arc<ClusterModel>, clock: Arc<dyn Clock>) -> Self {
        Self { model, clock }
    }

    pub fn recommend(&self, record: &StockRecord) -> Result<Recommendation, ScoringError> {
        let raw_features = features::extract_raw_features(record, self.clock.now())?;
        let features =
            features::standardize(raw_features.to_array(), self.model.means(), self.model.stds());

        let (cluster, predicted_target_delta) = match matcher::predict(&features, &self.model) {
            Ok(Prediction {
                cluster,
                predicted_target_delta,
            }) => (cluster, Some(predicted_target_delta)),
            Err(ScoringError::NoOutcomeAvailable { cluster }) => (cluster, None),
            Err(e) => return Err(e),
        };

        Ok(Recommendation {
            raw_features,
            features,
            cluster,
            predicted_target_delta,
        })
    }

    /// Fails with `NoOutcomeAvailable` when the model has no outcomes.
    pub fn predict(&self, record: &StockRecord) -> Result<Prediction, ScoringError> {
        let features = features::extract_features(record, &self.model, self.clock.now())?;
        matcher::predict(&features, &self.model)
    }
}

impl std::fmt::Debug for Recommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("k", &self.model.k())
            .finish_non_exhaustive()
    }
}
