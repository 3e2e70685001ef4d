use crate::domain::contract::ModelContract;
use crate::domain::model::ClusterModel;
use crate::error::ModelError;

/// Decodes and validates a model document.
pub fn parse_model(bytes: &[u8]) -> Result<ClusterModel, ModelError> {
    let contract = serde_json::from_slice::<ModelContract>(bytes).map_err(ModelError::Malformed)?;
    contract.validate_and_into_model()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model_json() -> serde_json::Value {
        json!({
            "k": 2,
            "features": ["target_delta", "has_brokerage", "action_score", "rating_delta_score", "time_delta"],
            "centroids": [[10, 1, 1, 1, 0], [-10, 0, -1, -1, 0]],
            "means": [0, 0, 0, 0, 0],
            "stds": [1, 1, 1, 1, 1],
            "avg_target_deltas": [5.0, -5.0]
        })
    }

    #[test]
    fn parses_exported_model() {
        let bytes = serde_json::to_vec(&model_json()).unwrap();
        let model = parse_model(&bytes).unwrap();
        assert_eq!(model.k(), 2);
        assert_eq!(model.means(), &[0.0; 5]);
        assert_eq!(model.avg_outcomes(), Some(&[5.0, -5.0][..]));
    }

    #[test]
    fn missing_outcomes_field_is_allowed() {
        let mut v = model_json();
        v.as_object_mut().unwrap().remove("avg_target_deltas");
        let model = parse_model(&serde_json::to_vec(&v).unwrap()).unwrap();
        assert!(model.avg_outcomes().is_none());
    }

    #[test]
    fn garbage_is_malformed() {
        let err = parse_model(b"not a model").unwrap_err();
        assert!(matches!(err, ModelError::Malformed(_)));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let mut v = model_json();
        v.as_object_mut().unwrap().remove("stds");
        let err = parse_model(&serde_json::to_vec(&v).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::Malformed(_)));
    }

    #[test]
    fn dimension_mismatch_is_inconsistent() {
        let mut v = model_json();
        v["centroids"] = json!([[10, 1, 1, 1], [-10, 0, -1, -1, 0]]);
        let err = parse_model(&serde_json::to_vec(&v).unwrap()).unwrap_err();
        assert!(matches!(err, ModelError::Inconsistent(_)));
    }
}
