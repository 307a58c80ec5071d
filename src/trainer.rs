use anyhow::{Result, bail};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::artifacts::{
    ARTIFACT_VERSION, ArtifactMetrics, InjuryModelArtifact, ScalerArtifact,
};
use crate::dataset::DatasetRow;
use crate::features::{self, BASE_FEATURE_LIST};
use crate::gbm::{GbmClassifier, Tree, sigmoid};
use crate::roster::{PlayerRecord, Position};

const L2_LAMBDA: f64 = 1.0;
const STD_FLOOR: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub struct TrainConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub min_leaf: usize,
    pub valid_fraction: f64,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            n_trees: 150,
            max_depth: 3,
            learning_rate: 0.05,
            min_leaf: 5,
            valid_fraction: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainReport {
    pub artifact: InjuryModelArtifact,
    pub metrics: ArtifactMetrics,
    pub rows_before_resample: usize,
    pub rows_after_resample: usize,
}

/// Raw feature row in training column order: the eleven dataset columns
/// plus the derived risk score, computed through the same function the
/// live builder uses so the contracts cannot drift.
pub fn feature_row(row: &DatasetRow) -> [f64; 12] {
    let score = features::injury_risk_score(&score_view(row));
    [
        row.age,
        row.games,
        row.minutes,
        row.minutes_90s,
        row.shots,
        row.n_injuries,
        row.n_severe_injuries,
        row.position_df,
        row.position_fw,
        row.position_gk,
        row.position_mf,
        score,
    ]
}

fn score_view(row: &DatasetRow) -> PlayerRecord {
    PlayerRecord {
        age: row.age.round().max(0.0) as u32,
        games: row.games.round().max(0.0) as u32,
        minutes: row.minutes,
        minutes_90s: row.minutes_90s,
        shots: row.shots.round().max(0.0) as u32,
        n_injuries: row.n_injuries.round().max(0.0) as u32,
        n_severe_injuries: row.n_severe_injuries.round().max(0.0) as u32,
        position: position_from_row(row),
    }
}

fn position_from_row(row: &DatasetRow) -> Option<Position> {
    if row.position_gk >= 0.5 {
        Some(Position::Goalkeeper)
    } else if row.position_df >= 0.5 {
        Some(Position::Defender)
    } else if row.position_mf >= 0.5 {
        Some(Position::Midfielder)
    } else if row.position_fw >= 0.5 {
        Some(Position::Forward)
    } else {
        None
    }
}

pub fn train(rows: &[DatasetRow], cfg: &TrainConfig) -> Result<TrainReport> {
    if rows.len() < 10 {
        bail!("training needs at least 10 rows, got {}", rows.len());
    }
    let positives = rows.iter().filter(|r| r.currently_injured).count();
    if positives == 0 || positives == rows.len() {
        bail!("training data has a single class; cannot fit a classifier");
    }

    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let mut samples: Vec<([f64; 12], bool)> = rows
        .iter()
        .map(|row| (feature_row(row), row.currently_injured))
        .collect();
    let rows_before = samples.len();
    oversample_minority(&mut samples, &mut rng);
    let rows_after = samples.len();
    samples.shuffle(&mut rng);

    let valid_len = ((samples.len() as f64 * cfg.valid_fraction).round() as usize)
        .clamp(1, samples.len() - 2);
    let (valid, train) = samples.split_at(valid_len);

    let scaler = fit_scaler(train);
    let x_train = standardize(train, &scaler);
    let y_train: Vec<f64> = train.iter().map(|(_, y)| *y as u8 as f64).collect();
    let x_valid = standardize(valid, &scaler);
    let y_valid: Vec<f64> = valid.iter().map(|(_, y)| *y as u8 as f64).collect();

    let classifier = boost(&x_train, &y_train, cfg);
    let metrics = evaluate(&classifier, &x_valid, &y_valid, x_train.len());

    let artifact = InjuryModelArtifact {
        version: ARTIFACT_VERSION,
        generated_at: chrono::Utc::now().to_rfc3339(),
        source: Some("fit_injury_model".to_string()),
        feature_names: BASE_FEATURE_LIST.clone(),
        scaler,
        classifier,
        metrics: Some(metrics),
    };

    Ok(TrainReport {
        artifact,
        metrics,
        rows_before_resample: rows_before,
        rows_after_resample: rows_after,
    })
}

/// Random oversampling of the minority class: double it, capped at the
/// majority class size.
fn oversample_minority(samples: &mut Vec<([f64; 12], bool)>, rng: &mut StdRng) {
    let label = minority_label(samples);
    let minority: Vec<usize> = samples
        .iter()
        .enumerate()
        .filter(|(_, (_, y))| *y == label)
        .map(|(idx, _)| idx)
        .collect();
    let majority_len = samples.len() - minority.len();
    let target = (minority.len() * 2).min(majority_len);
    if minority.is_empty() || target <= minority.len() {
        return;
    }

    for _ in 0..(target - minority.len()) {
        let pick = minority[rng.gen_range(0..minority.len())];
        let clone = samples[pick].clone();
        samples.push(clone);
    }
}

fn minority_label(samples: &[([f64; 12], bool)]) -> bool {
    let positives = samples.iter().filter(|(_, y)| *y).count();
    positives * 2 <= samples.len()
}

fn fit_scaler(samples: &[([f64; 12], bool)]) -> ScalerArtifact {
    let n = samples.len().max(1) as f64;
    let width = 12;
    let mut means = vec![0.0; width];
    let mut stds = vec![0.0; width];

    for (row, _) in samples {
        for (idx, &v) in row.iter().enumerate() {
            means[idx] += v;
        }
    }
    for mean in &mut means {
        *mean /= n;
    }
    for (row, _) in samples {
        for (idx, &v) in row.iter().enumerate() {
            stds[idx] += (v - means[idx]).powi(2);
        }
    }
    for std in &mut stds {
        *std = (*std / n).sqrt();
        if *std < STD_FLOOR {
            *std = 1.0;
        }
    }

    ScalerArtifact { means, stds }
}

fn standardize(samples: &[([f64; 12], bool)], scaler: &ScalerArtifact) -> Vec<Vec<f64>> {
    samples
        .iter()
        .map(|(row, _)| {
            row.iter()
                .enumerate()
                .map(|(idx, &v)| (v - scaler.means[idx]) / scaler.stds[idx].max(STD_FLOOR))
                .collect()
        })
        .collect()
}

fn boost(x: &[Vec<f64>], y: &[f64], cfg: &TrainConfig) -> GbmClassifier {
    let n = x.len();
    let pos_rate = (y.iter().sum::<f64>() / n as f64).clamp(1e-3, 1.0 - 1e-3);
    let base_score = (pos_rate / (1.0 - pos_rate)).ln();

    let mut margins = vec![base_score; n];
    let mut trees = Vec::with_capacity(cfg.n_trees);

    for _ in 0..cfg.n_trees {
        let mut grad = vec![0.0; n];
        let mut hess = vec![0.0; n];
        for i in 0..n {
            let p = sigmoid(margins[i]);
            grad[i] = y[i] - p;
            hess[i] = (p * (1.0 - p)).max(1e-9);
        }

        let indices: Vec<usize> = (0..n).collect();
        let tree = fit_tree(x, &grad, &hess, indices, cfg);
        for (i, xi) in x.iter().enumerate() {
            margins[i] += tree.predict(xi);
        }
        trees.push(tree);
    }

    GbmClassifier { base_score, trees }
}

fn fit_tree(x: &[Vec<f64>], grad: &[f64], hess: &[f64], indices: Vec<usize>, cfg: &TrainConfig) -> Tree {
    let mut tree = Tree {
        feature: Vec::new(),
        threshold: Vec::new(),
        left: Vec::new(),
        right: Vec::new(),
        value: Vec::new(),
    };
    grow(&mut tree, x, grad, hess, indices, 0, cfg);
    tree
}

fn grow(
    tree: &mut Tree,
    x: &[Vec<f64>],
    grad: &[f64],
    hess: &[f64],
    indices: Vec<usize>,
    depth: usize,
    cfg: &TrainConfig,
) -> i32 {
    let node = tree.feature.len() as i32;
    tree.feature.push(-1);
    tree.threshold.push(0.0);
    tree.left.push(-1);
    tree.right.push(-1);
    tree.value.push(0.0);

    let split = if depth < cfg.max_depth && indices.len() >= 2 * cfg.min_leaf {
        best_split(x, grad, hess, &indices, cfg.min_leaf)
    } else {
        None
    };

    match split {
        Some(split) => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                .into_iter()
                .partition(|&i| x[i][split.feature] < split.threshold);
            let left = grow(tree, x, grad, hess, left_idx, depth + 1, cfg);
            let right = grow(tree, x, grad, hess, right_idx, depth + 1, cfg);
            let slot = node as usize;
            tree.feature[slot] = split.feature as i32;
            tree.threshold[slot] = split.threshold;
            tree.left[slot] = left;
            tree.right[slot] = right;
        }
        None => {
            tree.value[node as usize] = cfg.learning_rate * leaf_value(grad, hess, &indices);
        }
    }

    node
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

fn best_split(
    x: &[Vec<f64>],
    grad: &[f64],
    hess: &[f64],
    indices: &[usize],
    min_leaf: usize,
) -> Option<Split> {
    let n_features = x.first().map(|row| row.len())?;
    let total_grad: f64 = indices.iter().map(|&i| grad[i]).sum();
    let total_hess: f64 = indices.iter().map(|&i| hess[i]).sum();
    let parent_score = total_grad * total_grad / (total_hess + L2_LAMBDA);

    (0..n_features)
        .into_par_iter()
        .filter_map(|feature| {
            let mut ordered: Vec<usize> = indices.to_vec();
            ordered.sort_by(|&a, &b| {
                x[a][feature]
                    .partial_cmp(&x[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_grad = 0.0;
            let mut left_hess = 0.0;
            let mut best: Option<Split> = None;

            for pos in 0..ordered.len().saturating_sub(1) {
                let i = ordered[pos];
                left_grad += grad[i];
                left_hess += hess[i];

                let here = x[i][feature];
                let next = x[ordered[pos + 1]][feature];
                if here == next {
                    continue;
                }
                let left_len = pos + 1;
                let right_len = ordered.len() - left_len;
                if left_len < min_leaf || right_len < min_leaf {
                    continue;
                }

                let right_grad = total_grad - left_grad;
                let right_hess = total_hess - left_hess;
                let gain = left_grad * left_grad / (left_hess + L2_LAMBDA)
                    + right_grad * right_grad / (right_hess + L2_LAMBDA)
                    - parent_score;
                if gain > best.map(|b| b.gain).unwrap_or(1e-9) {
                    best = Some(Split {
                        feature,
                        threshold: (here + next) / 2.0,
                        gain,
                    });
                }
            }

            best
        })
        .max_by(|a, b| {
            // Tie-break on the feature index so the parallel reduction is
            // deterministic for a fixed seed.
            a.gain
                .partial_cmp(&b.gain)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.feature.cmp(&a.feature))
        })
}

fn leaf_value(grad: &[f64], hess: &[f64], indices: &[usize]) -> f64 {
    let g: f64 = indices.iter().map(|&i| grad[i]).sum();
    let h: f64 = indices.iter().map(|&i| hess[i]).sum();
    g / (h + L2_LAMBDA)
}

fn evaluate(
    model: &GbmClassifier,
    x_valid: &[Vec<f64>],
    y_valid: &[f64],
    train_samples: usize,
) -> ArtifactMetrics {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut tn = 0usize;
    let mut fn_ = 0usize;

    for (xi, &yi) in x_valid.iter().zip(y_valid) {
        let predicted = model.predict_proba(xi) >= 0.5;
        let actual = yi >= 0.5;
        match (predicted, actual) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, false) => tn += 1,
            (false, true) => fn_ += 1,
        }
    }

    let total = (tp + fp + tn + fn_).max(1) as f64;
    let precision = if tp + fp > 0 {
        tp as f64 / (tp + fp) as f64
    } else {
        0.0
    };
    let recall = if tp + fn_ > 0 {
        tp as f64 / (tp + fn_) as f64
    } else {
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ArtifactMetrics {
        accuracy: (tp + tn) as f64 / total,
        precision,
        recall,
        f1,
        train_samples,
        valid_samples: x_valid.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::RiskModel;
    use crate::features::build_feature_vector;

    fn synthetic_rows(n: usize) -> Vec<DatasetRow> {
        // Deterministic grid: injury history drives the label, with enough
        // spread in the other columns to exercise split search.
        (0..n)
            .map(|i| {
                let injuries = (i % 6) as f64;
                let severe = ((i / 6) % 3) as f64;
                let injured = injuries >= 3.0 || severe >= 2.0;
                DatasetRow {
                    player_name: format!("P{i}"),
                    age: 20.0 + (i % 15) as f64,
                    games: 5.0 + (i % 25) as f64,
                    minutes: 300.0 + (i % 30) as f64 * 100.0,
                    minutes_90s: 4.0 + (i % 30) as f64,
                    shots: (i % 40) as f64,
                    n_injuries: injuries,
                    n_severe_injuries: severe,
                    position_df: ((i % 4) == 0) as u8 as f64,
                    position_fw: ((i % 4) == 1) as u8 as f64,
                    position_gk: ((i % 4) == 2) as u8 as f64,
                    position_mf: ((i % 4) == 3) as u8 as f64,
                    currently_injured: injured,
                }
            })
            .collect()
    }

    fn quick_cfg() -> TrainConfig {
        TrainConfig {
            n_trees: 40,
            max_depth: 3,
            learning_rate: 0.2,
            min_leaf: 3,
            valid_fraction: 0.2,
            seed: 42,
        }
    }

    #[test]
    fn feature_row_uses_the_shared_score_formula() {
        let rows = synthetic_rows(1);
        let row = feature_row(&rows[0]);
        assert_eq!(row.len(), 12);
        // n_injuries = 0, severe = 0, minutes_90s = 4, age = 20.
        assert_eq!(row[11], 0.0);

        let mut heavy = rows[0].clone();
        heavy.n_injuries = 2.0;
        heavy.n_severe_injuries = 1.0;
        heavy.age = 31.0;
        assert_eq!(feature_row(&heavy)[11], 2.0 * 1.5 + 2.5 + 1.0);
    }

    #[test]
    fn separable_dataset_trains_to_high_accuracy() {
        let rows = synthetic_rows(180);
        let report = train(&rows, &quick_cfg()).unwrap();
        assert!(
            report.metrics.accuracy > 0.85,
            "accuracy was {}",
            report.metrics.accuracy
        );
        assert!(report.metrics.valid_samples > 0);
    }

    #[test]
    fn emitted_artifact_passes_model_validation() {
        let rows = synthetic_rows(120);
        let report = train(&rows, &quick_cfg()).unwrap();
        let model = RiskModel::from_artifact(report.artifact, "test".to_string()).unwrap();
        assert_eq!(model.feature_names().len(), 12);

        let record = PlayerRecord::default();
        let fv = build_feature_vector(&record, model.feature_names()).unwrap();
        let p = model.predict_proba(&fv);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn trained_model_separates_injury_history() {
        let rows = synthetic_rows(180);
        let report = train(&rows, &quick_cfg()).unwrap();
        let model = RiskModel::from_artifact(report.artifact, "test".to_string()).unwrap();

        let clean = PlayerRecord {
            n_injuries: 0,
            n_severe_injuries: 0,
            ..PlayerRecord::default()
        };
        let heavy = PlayerRecord {
            n_injuries: 5,
            n_severe_injuries: 2,
            ..PlayerRecord::default()
        };
        let p_clean = model
            .predict_proba(&build_feature_vector(&clean, model.feature_names()).unwrap());
        let p_heavy = model
            .predict_proba(&build_feature_vector(&heavy, model.feature_names()).unwrap());
        assert!(p_heavy > p_clean);
    }

    #[test]
    fn oversampling_grows_the_minority_class() {
        let rows = synthetic_rows(120);
        let report = train(&rows, &quick_cfg()).unwrap();
        assert!(report.rows_after_resample >= report.rows_before_resample);
    }

    #[test]
    fn single_class_data_is_rejected() {
        let mut rows = synthetic_rows(40);
        for row in &mut rows {
            row.currently_injured = false;
        }
        assert!(train(&rows, &quick_cfg()).is_err());
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let rows = synthetic_rows(100);
        let a = train(&rows, &quick_cfg()).unwrap();
        let b = train(&rows, &quick_cfg()).unwrap();
        assert_eq!(a.artifact.classifier, b.artifact.classifier);
        assert_eq!(a.artifact.scaler, b.artifact.scaler);
    }
}
