// Lookups are exact and case-sensitive.
use crate::error::ScoringError;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const ACTION_SCORES: &[(&str, i8)] = &[
    ("upgrades", 1),
    ("upgraded by", 1),
    ("target raised by", 1),
    ("downgrades", -1),
    ("downgraded by", -1),
    ("target lowered by", -1),
    ("maintains", 0),
    ("initiates coverage on", 0),
    ("initiates", 0),
    ("initiated by", 0),
    ("reiterates", 0),
    ("reiterated by", 0),
    ("target set by", 0),
    ("", 0),
];

pub const RATING_SCORES: &[(&str, f64)] = &[
    ("strong-buy", 1.0),
    ("strong buy", 1.0),
    ("buy", 0.75),
    ("speculative buy", 0.75),
    ("outperform", 0.75),
    ("outperformer", 0.75),
    ("overweight", 0.75),
    ("accumulate", 0.75),
    ("market outperform", 0.75),
    ("sector outperform", 0.75),
    ("positive", 0.5),
    ("hold", 0.0),
    ("neutral", 0.0),
    ("market perform", 0.0),
    ("equal weight", 0.0),
    ("equal-weight", 0.0),
    ("in-line", 0.0),
    ("sector perform", 0.0),
    ("sector performer", 0.0),
    ("sector weight", 0.0),
    ("peer perform", 0.0),
    ("negative", -0.5),
    ("underperform", -0.75),
    ("underweight", -0.75),
    ("reduce", -0.75),
    ("sector underperform", -0.75),
    ("sell", -1.0),
    ("strong sell", -1.0),
    ("", 0.0),
];

static ACTIONS: LazyLock<HashMap<&'static str, i8>> =
    LazyLock::new(|| ACTION_SCORES.iter().copied().collect());

static RATINGS: LazyLock<HashMap<&'static str, f64>> =
    LazyLock::new(|| RATING_SCORES.iter().copied().collect());

pub fn action_score(action: &str) -> Result<i8, ScoringError> {
    ACTIONS
        .get(action)
        .copied()
        .ok_or_else(|| ScoringError::UnknownCategory {
            field: "action",
            value: action.to_string(),
        })
}

/// Unlisted labels count as neutral.
pub fn rating_score(label: &str) -> f64 {
    RATINGS.get(label).copied().unwrap_or(0.0)
}

pub fn rating_delta(from: &str, to: &str) -> f64 {
    rating_score(to) - rating_score(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("upgrades", 1)]
    #[case("upgraded by", 1)]
    #[case("target raised by", 1)]
    #[case("downgrades", -1)]
    #[case("target lowered by", -1)]
    #[case("initiates coverage on", 0)]
    #[case("reiterated by", 0)]
    #[case("", 0)]
    fn scores_known_actions(#[case] action: &str, #[case] expected: i8) {
        assert_eq!(action_score(action).unwrap(), expected);
    }

    #[rstest]
    #[case("frobnicates")]
    #[case("Upgrades")]
    #[case(" upgrades")]
    fn rejects_unknown_actions(#[case] action: &str) {
        assert_eq!(
            action_score(action),
            Err(ScoringError::UnknownCategory {
                field: "action",
                value: action.to_string()
            })
        );
    }

    #[rstest]
    #[case("hold", "strong-buy", 1.0)]
    #[case("buy", "sell", -1.75)]
    #[case("", "", 0.0)]
    #[case("negative", "positive", 1.0)]
    #[case("underweight", "overweight", 1.5)]
    fn rating_delta_is_to_minus_from(#[case] from: &str, #[case] to: &str, #[case] expected: f64) {
        assert!((rating_delta(from, to) - expected).abs() < 1e-12);
    }

    #[test]
    fn unknown_ratings_are_neutral() {
        assert_eq!(rating_score("Moderate Buy"), 0.0);
        assert_eq!(rating_delta("mystery", "buy"), 0.75);
    }

    #[test]
    fn tables_have_no_duplicate_keys() {
        assert_eq!(ACTIONS.len(), ACTION_SCORES.len());
        assert_eq!(RATINGS.len(), RATING_SCORES.len());
    }

    #[test]
    fn rating_scores_stay_in_range() {
        assert!(RATING_SCORES.iter().all(|(_, s)| (-1.0..=1.0).contains(s)));
    }
}
