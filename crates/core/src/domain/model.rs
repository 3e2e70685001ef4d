use serde::Serialize;

pub const FEATURE_COUNT: usize = 5;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "target_delta",
    "has_brokerage",
    "action_score",
    "rating_delta_score",
    "time_delta",
];

pub type Centroid = [f64; FEATURE_COUNT];

// Built only by `ModelContract::validate_and_into_model`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterModel {
    pub(crate) feature_names: [String; FEATURE_COUNT],
    pub(crate) centroids: Vec<Centroid>,
    pub(crate) means: [f64; FEATURE_COUNT],
    pub(crate) stds: [f64; FEATURE_COUNT],
    pub(crate) avg_outcomes: Option<Vec<f64>>,
}

impl ClusterModel {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn feature_names(&self) -> &[String; FEATURE_COUNT] {
        &self.feature_names
    }

    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    pub fn means(&self) -> &[f64; FEATURE_COUNT] {
        &self.means
    }

    pub fn stds(&self) -> &[f64; FEATURE_COUNT] {
        &self.stds
    }

    pub fn avg_outcomes(&self) -> Option<&[f64]> {
        self.avg_outcomes.as_deref()
    }

    pub fn has_canonical_feature_names(&self) -> bool {
        self.feature_names
            .iter()
            .zip(FEATURE_NAMES)
            .all(|(name, canonical)| name == canonical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawFeatures {
    pub target_delta: f64,
    pub has_brokerage: f64,
    pub action_score: f64,
    pub rating_delta_score: f64,
    pub time_delta: f64,
}

impl RawFeatures {
    pub fn to_array(self) -> [f64; FEATURE_COUNT] {
        [
            self.target_delta,
            self.has_brokerage,
            self.action_score,
            self.rating_delta_score,
            self.time_delta,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub cluster: usize,
    pub predicted_target_delta: f64,
}
