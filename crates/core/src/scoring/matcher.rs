use crate::domain::model::{Centroid, ClusterModel, FeatureVector, Prediction};
use crate::error::ScoringError;

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the closest centroid. Ties go to the lowest index.
pub fn nearest_centroid(
    features: &FeatureVector,
    centroids: &[Centroid],
) -> Result<usize, ScoringError> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(features.values(), centroid);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((idx, d)),
        }
    }
    best.map(|(idx, _)| idx).ok_or(ScoringError::EmptyModel)
}

pub fn predict(features: &FeatureVector, model: &ClusterModel) -> Result<Prediction, ScoringError> {
    let cluster = nearest_centroid(features, model.centroids())?;
    let predicted_target_delta = model
        .avg_outcomes()
        .and_then(|outcomes| outcomes.get(cluster))
        .copied()
        .ok_or(ScoringError::NoOutcomeAvailable { cluster })?;

    Ok(Prediction {
        cluster,
        predicted_target_delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::ModelContract;

    fn model(centroids: Vec<Vec<f64>>, outcomes: Option<Vec<f64>>) -> ClusterModel {
        ModelContract {
            k: centroids.len(),
            features: (0..5).map(|i| format!("f{i}")).collect(),
            centroids,
            means: vec![0.0; 5],
            stds: vec![1.0; 5],
            avg_target_deltas: outcomes,
        }
        .validate_and_into_model()
        .unwrap()
    }

    #[test]
    fn empty_centroids_is_an_error() {
        let v = FeatureVector([0.0; 5]);
        assert_eq!(nearest_centroid(&v, &[]), Err(ScoringError::EmptyModel));
    }

    #[test]
    fn exact_match_selects_that_centroid() {
        let centroids = [
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [1.0, 2.0, 3.0, 4.0, 5.0],
            [-1.0, -2.0, -3.0, -4.0, -5.0],
        ];
        for (idx, c) in centroids.iter().enumerate() {
            assert_eq!(nearest_centroid(&FeatureVector(*c), &centroids).unwrap(), idx);
        }
    }

    #[test]
    fn ties_go_to_the_lowest_index() {
        let centroids = [
            [5.0, 0.0, 0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0, 0.0, 0.0],
        ];
        let v = FeatureVector([0.0; 5]);
        for _ in 0..10 {
            assert_eq!(nearest_centroid(&v, &centroids).unwrap(), 1);
        }
    }

    #[test]
    fn index_is_always_in_range() {
        let m = model(
            vec![
                vec![0.0, 0.0, 0.0, 0.0, 0.0],
                vec![3.0, -1.0, 0.5, 2.0, 7.0],
                vec![-4.0, 2.0, 1.0, -1.0, -3.0],
                vec![1e6, 1e6, 1e6, 1e6, 1e6],
            ],
            None,
        );
        let samples = [-1e9, -7.5, -1.0, 0.0, 0.3, 2.0, 11.0, 1e9];
        for a in samples {
            for b in samples {
                let v = FeatureVector([a, b, a - b, b * 0.5, -a]);
                let idx = nearest_centroid(&v, m.centroids()).unwrap();
                assert!(idx < m.k());
            }
        }
    }

    #[test]
    fn predicts_outcome_of_nearest_cluster() {
        let m = model(
            vec![vec![10.0, 1.0, 1.0, 1.0, 0.0], vec![-10.0, 0.0, -1.0, -1.0, 0.0]],
            Some(vec![5.0, -5.0]),
        );
        let p = predict(&FeatureVector([-8.0, 0.0, -1.0, 0.0, 3.0]), &m).unwrap();
        assert_eq!(
            p,
            Prediction {
                cluster: 1,
                predicted_target_delta: -5.0
            }
        );
    }

    #[test]
    fn missing_outcomes_reports_cluster() {
        let m = model(
            vec![vec![10.0, 1.0, 1.0, 1.0, 0.0], vec![-10.0, 0.0, -1.0, -1.0, 0.0]],
            None,
        );
        assert_eq!(
            predict(&FeatureVector([10.0, 1.0, 1.0, 1.0, 0.0]), &m),
            Err(ScoringError::NoOutcomeAvailable { cluster: 0 })
        );
    }
}
