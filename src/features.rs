use once_cell::sync::Lazy;
use thiserror::Error;

use crate::roster::PlayerRecord;

/// Base feature keys in training column order. The artifact's feature list
/// is the authority at inference time; this constant is what the builder
/// can produce on its own and what the trainer emits.
pub const BASE_FEATURE_NAMES: [&str; 12] = [
    "age",
    "games",
    "minutes",
    "minutes_90s",
    "shots",
    "n_injuries",
    "n_severe_injuries",
    "position_DF",
    "position_FW",
    "position_GK",
    "position_MF",
    "injury_risk_score",
];

/// Owned copy of `BASE_FEATURE_NAMES`, in the same order, for callers that
/// need `&[String]` (the trainer and the schema-driven builder).
pub static BASE_FEATURE_LIST: Lazy<Vec<String>> =
    Lazy::new(|| BASE_FEATURE_NAMES.iter().map(|s| s.to_string()).collect());

const INJURY_WEIGHT: f64 = 1.5;
const SEVERE_INJURY_WEIGHT: f64 = 2.5;
const MATCH_LOAD_THRESHOLD: f64 = 30.0;
const AGE_THRESHOLD: u32 = 30;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("expected feature list is empty; classifier schema unavailable")]
    MissingFeatureList,
    #[error("feature {0:?} has a non-finite value")]
    NonFiniteValue(String),
}

/// Hand-engineered workload/history score, distinct from the classifier's
/// learned probability. Shared verbatim between the trainer and the live
/// dashboard so the feature contract cannot drift.
pub fn injury_risk_score(record: &PlayerRecord) -> f64 {
    let mut score =
        record.n_injuries as f64 * INJURY_WEIGHT + record.n_severe_injuries as f64 * SEVERE_INJURY_WEIGHT;
    if record.minutes_90s > MATCH_LOAD_THRESHOLD {
        score += 1.0;
    }
    if record.age > AGE_THRESHOLD {
        score += 1.0;
    }
    score
}

/// Fixed-order numeric vector matching the classifier's expected schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n.as_str() == name)
            .map(|idx| self.values[idx])
    }
}

/// Assemble the record's features in the classifier's expected column
/// order. Expected names the record cannot produce are zero-filled; record
/// keys the classifier does not expect are dropped.
pub fn build_feature_vector(
    record: &PlayerRecord,
    expected: &[String],
) -> Result<FeatureVector, SchemaError> {
    if expected.is_empty() {
        return Err(SchemaError::MissingFeatureList);
    }

    let pairs = base_pairs(record);
    let mut values = Vec::with_capacity(expected.len());
    for name in expected {
        let value = pairs
            .iter()
            .find(|(key, _)| *key == name.as_str())
            .map(|(_, v)| *v)
            .unwrap_or(0.0);
        if !value.is_finite() {
            return Err(SchemaError::NonFiniteValue(name.clone()));
        }
        values.push(value);
    }

    Ok(FeatureVector {
        names: expected.to_vec(),
        values,
    })
}

fn base_pairs(record: &PlayerRecord) -> [(&'static str, f64); 12] {
    let position = |key: &str| -> f64 {
        match record.position {
            Some(p) if p.indicator_key() == key => 1.0,
            _ => 0.0,
        }
    };

    [
        ("age", record.age as f64),
        ("games", record.games as f64),
        ("minutes", record.minutes),
        ("minutes_90s", record.minutes_90s),
        ("shots", record.shots as f64),
        ("n_injuries", record.n_injuries as f64),
        ("n_severe_injuries", record.n_severe_injuries as f64),
        ("position_DF", position("position_DF")),
        ("position_FW", position("position_FW")),
        ("position_GK", position("position_GK")),
        ("position_MF", position("position_MF")),
        ("injury_risk_score", injury_risk_score(record)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Position;

    fn record() -> PlayerRecord {
        PlayerRecord {
            age: 23,
            games: 14,
            minutes: 1260.0,
            minutes_90s: 14.0,
            shots: 20,
            n_injuries: 2,
            n_severe_injuries: 0,
            position: Some(Position::Forward),
        }
    }

    fn expected_names() -> Vec<String> {
        BASE_FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn risk_score_matches_reference_scenario() {
        // 2 * 1.5 + 0 * 2.5, no load term, no age term.
        assert_eq!(injury_risk_score(&record()), 3.0);
    }

    #[test]
    fn risk_score_adds_load_and_age_terms() {
        let mut r = record();
        r.minutes_90s = 31.0;
        r.age = 31;
        assert_eq!(injury_risk_score(&r), 5.0);
    }

    #[test]
    fn risk_score_is_non_negative_and_deterministic() {
        let r = PlayerRecord::default();
        assert!(injury_risk_score(&r) >= 0.0);
        assert_eq!(injury_risk_score(&record()), injury_risk_score(&record()));
    }

    #[test]
    fn boundary_values_do_not_trigger_threshold_terms() {
        let mut r = record();
        r.minutes_90s = 30.0;
        r.age = 30;
        // Strict comparisons: exactly-at-threshold adds nothing.
        assert_eq!(injury_risk_score(&r), 3.0);
    }

    #[test]
    fn vector_follows_expected_order() {
        let fv = build_feature_vector(&record(), &expected_names()).unwrap();
        assert_eq!(fv.len(), 12);
        assert_eq!(fv.value("age"), Some(23.0));
        assert_eq!(fv.value("position_FW"), Some(1.0));
        assert_eq!(fv.value("position_GK"), Some(0.0));
        assert_eq!(fv.value("injury_risk_score"), Some(3.0));
    }

    #[test]
    fn vector_order_is_schema_driven_not_record_driven() {
        let mut reversed: Vec<String> = expected_names();
        reversed.reverse();
        let fv = build_feature_vector(&record(), &reversed).unwrap();
        assert_eq!(fv.names()[0], "injury_risk_score");
        assert_eq!(fv.values()[0], 3.0);
        assert_eq!(fv.names()[11], "age");
        assert_eq!(fv.values()[11], 23.0);
    }

    #[test]
    fn unknown_expected_names_are_zero_filled() {
        let mut names = expected_names();
        names.push("xg_per_90".to_string());
        let fv = build_feature_vector(&record(), &names).unwrap();
        assert_eq!(fv.value("xg_per_90"), Some(0.0));
    }

    #[test]
    fn empty_schema_is_rejected() {
        let err = build_feature_vector(&record(), &[]).unwrap_err();
        assert!(matches!(err, SchemaError::MissingFeatureList));
    }

    #[test]
    fn unknown_position_zeroes_all_indicators() {
        let mut r = record();
        r.position = None;
        let fv = build_feature_vector(&r, &expected_names()).unwrap();
        for key in ["position_DF", "position_FW", "position_GK", "position_MF"] {
            assert_eq!(fv.value(key), Some(0.0));
        }
    }
}
