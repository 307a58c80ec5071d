use serde::{Deserialize, Serialize};

/// One regression tree in flat-array form: node `i` splits on
/// `feature[i]` at `threshold[i]` (strictly-less goes left), or is a leaf
/// when `feature[i] < 0`, in which case `value[i]` is its output. Leaf
/// values are already scaled by the learning rate at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub feature: Vec<i32>,
    pub threshold: Vec<f64>,
    pub left: Vec<i32>,
    pub right: Vec<i32>,
    pub value: Vec<f64>,
}

impl Tree {
    pub fn leaf(value: f64) -> Self {
        Self {
            feature: vec![-1],
            threshold: vec![0.0],
            left: vec![-1],
            right: vec![-1],
            value: vec![value],
        }
    }

    pub fn len(&self) -> usize {
        self.feature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature.is_empty()
    }

    /// Walk from the root to a leaf. Malformed indices fall back to 0.0
    /// rather than panicking; `validate` rejects such trees at load time.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            let Some(&feature) = self.feature.get(node) else {
                return 0.0;
            };
            if feature < 0 {
                return self.value.get(node).copied().unwrap_or(0.0);
            }
            let Some(&raw) = x.get(feature as usize) else {
                return 0.0;
            };
            let (Some(&threshold), Some(&left), Some(&right)) = (
                self.threshold.get(node),
                self.left.get(node),
                self.right.get(node),
            ) else {
                return 0.0;
            };
            let next = if raw < threshold { left } else { right };
            if next < 0 {
                return 0.0;
            }
            node = next as usize;
        }
    }

    /// Structural check: consistent array lengths, child indices inside the
    /// node table, split features inside the schema.
    pub fn validate(&self, n_features: usize) -> Result<(), TreeShapeIssue> {
        let n = self.feature.len();
        if n == 0
            || self.threshold.len() != n
            || self.left.len() != n
            || self.right.len() != n
            || self.value.len() != n
        {
            return Err(TreeShapeIssue::RaggedArrays);
        }
        for (idx, &feature) in self.feature.iter().enumerate() {
            if feature < 0 {
                continue;
            }
            if feature as usize >= n_features {
                return Err(TreeShapeIssue::FeatureOutOfRange {
                    node: idx,
                    feature: feature as usize,
                });
            }
            let (l, r) = (self.left[idx], self.right[idx]);
            if l < 0 || r < 0 || l as usize >= n || r as usize >= n {
                return Err(TreeShapeIssue::ChildOutOfRange { node: idx });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeShapeIssue {
    RaggedArrays,
    FeatureOutOfRange { node: usize, feature: usize },
    ChildOutOfRange { node: usize },
}

/// Gradient-boosted binary classifier: margin is `base_score` (prior
/// log-odds) plus the sum of tree outputs; the positive-class probability
/// is the sigmoid of the margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbmClassifier {
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl GbmClassifier {
    pub fn predict_margin(&self, x: &[f64]) -> f64 {
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += tree.predict(x);
        }
        margin
    }

    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        sigmoid(self.predict_margin(x))
    }

    pub fn validate(&self, n_features: usize) -> Result<(), (usize, TreeShapeIssue)> {
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features).map_err(|issue| (idx, issue))?;
        }
        Ok(())
    }
}

pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: i32, threshold: f64, left: f64, right: f64) -> Tree {
        Tree {
            feature: vec![feature, -1, -1],
            threshold: vec![threshold, 0.0, 0.0],
            left: vec![1, -1, -1],
            right: vec![2, -1, -1],
            value: vec![0.0, left, right],
        }
    }

    #[test]
    fn stump_routes_on_strict_less() {
        let tree = stump(0, 0.5, -1.0, 1.0);
        assert_eq!(tree.predict(&[0.49]), -1.0);
        assert_eq!(tree.predict(&[0.5]), 1.0);
        assert_eq!(tree.predict(&[0.51]), 1.0);
    }

    #[test]
    fn margin_sums_base_and_trees() {
        let model = GbmClassifier {
            base_score: -0.5,
            trees: vec![stump(0, 0.0, -0.25, 0.25), Tree::leaf(0.1)],
        };
        let margin = model.predict_margin(&[1.0]);
        assert!((margin - (-0.5 + 0.25 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn proba_is_bounded_and_monotone_in_margin() {
        let model = GbmClassifier {
            base_score: 0.0,
            trees: vec![stump(0, 0.0, -2.0, 2.0)],
        };
        let low = model.predict_proba(&[-1.0]);
        let high = model.predict_proba(&[1.0]);
        assert!(low > 0.0 && low < 0.5);
        assert!(high > 0.5 && high < 1.0);
    }

    #[test]
    fn sigmoid_midpoint() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn validate_rejects_out_of_schema_feature() {
        let tree = stump(7, 0.0, -1.0, 1.0);
        assert!(matches!(
            tree.validate(7),
            Err(TreeShapeIssue::FeatureOutOfRange { feature: 7, .. })
        ));
        assert!(tree.validate(8).is_ok());
    }

    #[test]
    fn validate_rejects_ragged_arrays() {
        let mut tree = Tree::leaf(0.3);
        tree.threshold.push(1.0);
        assert!(matches!(tree.validate(1), Err(TreeShapeIssue::RaggedArrays)));
    }

    #[test]
    fn validate_rejects_dangling_child() {
        let tree = Tree {
            feature: vec![0, -1],
            threshold: vec![0.0, 0.0],
            left: vec![1, -1],
            right: vec![9, -1],
            value: vec![0.0, 0.5],
        };
        assert!(matches!(
            tree.validate(1),
            Err(TreeShapeIssue::ChildOutOfRange { node: 0 })
        ));
    }
}
