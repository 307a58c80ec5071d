use crate::artifacts::RiskModel;
use crate::features::{self, SchemaError};
use crate::roster::PlayerRecord;

// Tier thresholds. Evaluated in order; any single trigger escalates the
// tier (deliberate recall bias for injury history over model probability).
const PROB_HIGH: f64 = 0.6;
const PROB_MEDIUM: f64 = 0.3;
const PROB_INJURED: f64 = 0.45;
const SCORE_HIGH: f64 = 8.0;
const SCORE_MEDIUM: f64 = 4.0;
const SEVERE_HIGH: u32 = 2;
const SEVERE_MEDIUM: u32 = 1;
const INJURIES_HIGH: u32 = 4;
const INJURIES_MEDIUM: u32 = 2;

// Factor thresholds, independent of the tier boundaries above.
const FACTOR_INJURIES_HIGH: u32 = 3;
const FACTOR_INJURIES_MEDIUM: u32 = 2;
const FACTOR_MATCH_LOAD: f64 = 30.0;
const FACTOR_AGE: u32 = 30;
const FACTOR_LIMITED_GAMES: u32 = 10;

// Workload flags.
const MATCH_LOAD_HIGH: f64 = 30.0;
const SEASON_LOAD_HIGH: f64 = 3000.0;
const MATCH_FITNESS_LOW: f64 = 60.0;
const REC_INJURY_HISTORY: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskFactor {
    pub icon: &'static str,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadSummary {
    pub match_load: f64,
    pub season_load: f64,
    pub match_fitness: f64,
}

impl WorkloadSummary {
    pub fn match_load_high(&self) -> bool {
        self.match_load > MATCH_LOAD_HIGH
    }

    pub fn season_load_high(&self) -> bool {
        self.season_load > SEASON_LOAD_HIGH
    }

    pub fn match_fitness_low(&self) -> bool {
        self.match_fitness < MATCH_FITNESS_LOW
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation {
    pub icon: &'static str,
    pub headline: &'static str,
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub probability: f64,
    pub injury_risk_score: f64,
    pub level: RiskLevel,
    pub is_injured: bool,
    pub factors: Vec<RiskFactor>,
    pub workload: WorkloadSummary,
    pub recommendations: Vec<Recommendation>,
}

/// Threshold rules combining the model probability with the raw risk
/// score and injury counts. First matching tier wins; a long injury
/// history always escalates regardless of the model output.
pub fn classify(
    probability: f64,
    risk_score: f64,
    n_injuries: u32,
    n_severe_injuries: u32,
) -> (RiskLevel, bool) {
    if probability > PROB_HIGH
        || risk_score >= SCORE_HIGH
        || n_severe_injuries >= SEVERE_HIGH
        || n_injuries >= INJURIES_HIGH
    {
        (RiskLevel::High, true)
    } else if probability > PROB_MEDIUM
        || risk_score >= SCORE_MEDIUM
        || n_severe_injuries >= SEVERE_MEDIUM
        || n_injuries >= INJURIES_MEDIUM
    {
        (RiskLevel::Medium, probability > PROB_INJURED)
    } else {
        (RiskLevel::Low, false)
    }
}

pub fn risk_factors(record: &PlayerRecord) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if record.n_injuries > 0 {
        let severity = if record.n_injuries >= FACTOR_INJURIES_HIGH {
            Severity::High
        } else if record.n_injuries >= FACTOR_INJURIES_MEDIUM {
            Severity::Medium
        } else {
            Severity::Low
        };
        factors.push(RiskFactor {
            icon: "[INJ]",
            description: format!("Previous injuries: {}", record.n_injuries),
            severity,
        });
    }

    if record.n_severe_injuries > 0 {
        factors.push(RiskFactor {
            icon: "[SEV]",
            description: format!("Severe injuries: {}", record.n_severe_injuries),
            severity: Severity::High,
        });
    }

    if record.minutes_90s > FACTOR_MATCH_LOAD {
        factors.push(RiskFactor {
            icon: "[LOAD]",
            description: "High match load".to_string(),
            severity: Severity::Medium,
        });
    }

    if record.age > FACTOR_AGE {
        factors.push(RiskFactor {
            icon: "[AGE]",
            description: format!("Age factor: {} years", record.age),
            severity: Severity::Medium,
        });
    }

    if record.games < FACTOR_LIMITED_GAMES {
        factors.push(RiskFactor {
            icon: "[FIT]",
            description: "Limited game time".to_string(),
            severity: Severity::Low,
        });
    }

    factors
}

pub fn workload_summary(record: &PlayerRecord) -> WorkloadSummary {
    WorkloadSummary {
        match_load: record.minutes_90s,
        season_load: record.minutes,
        match_fitness: record.minutes / record.games.max(1) as f64,
    }
}

pub fn recommendations(record: &PlayerRecord) -> Vec<Recommendation> {
    let workload = workload_summary(record);
    let mut out = Vec::new();

    if workload.match_load_high() {
        out.push(Recommendation {
            icon: "[ROT]",
            headline: "High match load detected - consider rotation",
            action: "Reduce minutes in the next few games",
        });
    }
    if workload.season_load_high() {
        out.push(Recommendation {
            icon: "[FTG]",
            headline: "High season workload - monitor fatigue",
            action: "Add recovery sessions between fixtures",
        });
    }
    if workload.match_fitness_low() {
        out.push(Recommendation {
            icon: "[RMP]",
            headline: "Match fitness below optimal",
            action: "Gradually increase game time",
        });
    }
    if record.n_injuries > REC_INJURY_HISTORY {
        out.push(Recommendation {
            icon: "[MED]",
            headline: "Injury history requires attention",
            action: "Put a custom training program in place",
        });
    }

    out
}

/// Full synchronous assessment: feature build, standardized inference,
/// tier rules, advisory output. Recomputed from scratch per interaction.
pub fn assess(model: &RiskModel, record: &PlayerRecord) -> Result<RiskAssessment, SchemaError> {
    let vector = features::build_feature_vector(record, model.feature_names())?;
    let probability = model.predict_proba(&vector);
    let injury_risk_score = features::injury_risk_score(record);
    let (level, is_injured) = classify(
        probability,
        injury_risk_score,
        record.n_injuries,
        record.n_severe_injuries,
    );

    Ok(RiskAssessment {
        probability,
        injury_risk_score,
        level,
        is_injured,
        factors: risk_factors(record),
        workload: workload_summary(record),
        recommendations: recommendations(record),
    })
}
