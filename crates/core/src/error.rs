use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cluster model is not valid JSON for the model schema")]
    Malformed(#[source] serde_json::Error),
    #[error("cluster model is inconsistent: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("failed to parse {field} {value:?}: {reason}")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("unknown {field} {value:?}")]
    UnknownCategory { field: &'static str, value: String },
    #[error("{field} {value:?} is zero; target delta is undefined")]
    DivisionByZero { field: &'static str, value: String },
    #[error("cluster model has no centroids")]
    EmptyModel,
    #[error("cluster model has no outcome values (nearest cluster {cluster})")]
    NoOutcomeAvailable { cluster: usize },
}

impl ScoringError {
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::UnknownCategory { .. } | Self::DivisionByZero { .. }
        )
    }
}
