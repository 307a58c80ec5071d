use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;

use crate::features;
use crate::roster::PlayerRecord;

pub const TREND_WEEKS: usize = 10;

/// One synthetic week of the fitness trend shown on the History screen.
/// Real telemetry is not wired in; the series is generated around the
/// player's current attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub week: NaiveDate,
    pub minutes: f64,
    pub fitness: f64,
    pub risk: f64,
}

pub fn generate_fitness_trend(record: &PlayerRecord, rng: &mut impl Rng) -> Vec<TrendPoint> {
    generate_fitness_trend_from(record, rng, Utc::now().date_naive())
}

pub fn generate_fitness_trend_from(
    record: &PlayerRecord,
    rng: &mut impl Rng,
    end: NaiveDate,
) -> Vec<TrendPoint> {
    let weeks = TREND_WEEKS;
    let risk_center = (35.0 + features::injury_risk_score(record) * 5.0).min(85.0);

    (0..weeks)
        .map(|i| {
            let frac = if weeks > 1 {
                i as f64 / (weeks - 1) as f64
            } else {
                1.0
            };
            let week = end - Duration::weeks((weeks - 1 - i) as i64);
            TrendPoint {
                week,
                minutes: record.minutes * frac,
                fitness: (80.0_f64 + rng.gen_range(-10.0..10.0)).clamp(0.0, 100.0),
                risk: (risk_center + rng.gen_range(-15.0..15.0)).clamp(0.0, 100.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn record() -> PlayerRecord {
        PlayerRecord {
            minutes: 1260.0,
            ..PlayerRecord::default()
        }
    }

    #[test]
    fn trend_has_ten_weekly_points_ending_at_anchor() {
        let mut rng = StdRng::seed_from_u64(7);
        let end = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let trend = generate_fitness_trend_from(&record(), &mut rng, end);
        assert_eq!(trend.len(), TREND_WEEKS);
        assert_eq!(trend.last().unwrap().week, end);
        assert_eq!(trend[0].week, end - Duration::weeks(9));
    }

    #[test]
    fn minutes_ramp_from_zero_to_current() {
        let mut rng = StdRng::seed_from_u64(7);
        let end = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let trend = generate_fitness_trend_from(&record(), &mut rng, end);
        assert_eq!(trend[0].minutes, 0.0);
        assert_eq!(trend.last().unwrap().minutes, 1260.0);
        for pair in trend.windows(2) {
            assert!(pair[1].minutes >= pair[0].minutes);
        }
    }

    #[test]
    fn scores_stay_in_percent_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let end = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        for point in generate_fitness_trend_from(&record(), &mut rng, end) {
            assert!((0.0..=100.0).contains(&point.fitness));
            assert!((0.0..=100.0).contains(&point.risk));
        }
    }
}
