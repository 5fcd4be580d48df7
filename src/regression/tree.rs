//! CART regression tree.
//!
//! Splits minimize the summed squared error of the two children. Every
//! feature and every midpoint between consecutive distinct values is tried,
//! so fitting is deterministic.

use crate::error::{Result, TsmlError};
use crate::regression::traits::TreeRegressor;

/// Configuration for the regression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeConfig {
    /// Maximum depth (None for unlimited).
    pub max_depth: Option<usize>,
    /// Minimum number of samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum number of samples in each leaf.
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TreeConfig {
    /// Set the maximum depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set the minimum number of samples required to split.
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples per leaf.
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// Regression tree with squared-error splits.
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeRegressor {
    config: TreeConfig,
    root: Option<Node>,
    n_features: usize,
}

impl DecisionTreeRegressor {
    /// Create an unfitted tree with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unfitted tree with the given configuration.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Depth of the fitted tree (0 for a single leaf).
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(Node::depth)
    }

    /// Number of leaves of the fitted tree.
    pub fn n_leaves(&self) -> Option<usize> {
        self.root.as_ref().map(Node::n_leaves)
    }

    /// Number of features seen during fit.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn build(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &mut [usize],
        depth: usize,
    ) -> Node {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| targets[i]).sum();
        let value = sum / n as f64;

        let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);
        if depth_reached
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
        {
            return Node::Leaf { value };
        }

        let sum_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
        let parent_sse = sum_sq - sum * sum / n as f64;
        if parent_sse <= f64::EPSILON * sum_sq.max(1.0) {
            return Node::Leaf { value };
        }

        let Some(best) = self.best_split(features, targets, indices) else {
            return Node::Leaf { value };
        };

        // Partition in place: left rows first
        let mut boundary = 0;
        for k in 0..n {
            if features[indices[k]][best.feature] <= best.threshold {
                indices.swap(boundary, k);
                boundary += 1;
            }
        }
        let (left_idx, right_idx) = indices.split_at_mut(boundary);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(features, targets, left_idx, depth + 1)),
            right: Box::new(self.build(features, targets, right_idx, depth + 1)),
        }
    }

    fn best_split(
        &self,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();

        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature in 0..self.n_features {
            order.sort_by(|&a, &b| {
                features[a][feature]
                    .partial_cmp(&features[b][feature])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let y = targets[order[k - 1]];
                left_sum += y;
                left_sq += y * y;

                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let lo = features[order[k - 1]][feature];
                let hi = features[order[k]][feature];
                if lo >= hi {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / k as f64)
                    + (right_sq - right_sum * right_sum / (n - k) as f64);

                if best.is_none_or(|b| sse < b.sse) {
                    let mut threshold = 0.5 * (lo + hi);
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        sse,
                    });
                }
            }
        }

        best
    }
}

fn check_features(features: &[Vec<f64>]) -> Result<usize> {
    let Some(first) = features.first() else {
        return Err(TsmlError::EmptyData);
    };
    let n_features = first.len();
    if let Some(row) = features.iter().find(|row| row.len() != n_features) {
        return Err(TsmlError::DimensionMismatch {
            expected: n_features,
            got: row.len(),
        });
    }
    Ok(n_features)
}

impl TreeRegressor for DecisionTreeRegressor {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
        let n_features = check_features(features)?;
        if targets.len() != features.len() {
            return Err(TsmlError::DimensionMismatch {
                expected: features.len(),
                got: targets.len(),
            });
        }
        if self.config.min_samples_split < 2 {
            return Err(TsmlError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.config.min_samples_leaf == 0 {
            return Err(TsmlError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }

        self.n_features = n_features;
        let mut indices: Vec<usize> = (0..features.len()).collect();
        self.root = Some(self.build(features, targets, &mut indices, 0));
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        let root = self.root.as_ref().ok_or(TsmlError::FitRequired)?;
        features
            .iter()
            .map(|row| {
                if row.len() != self.n_features {
                    return Err(TsmlError::DimensionMismatch {
                        expected: self.n_features,
                        got: row.len(),
                    });
                }
                Ok(root.predict(row))
            })
            .collect()
    }

    fn is_fitted(&self) -> bool {
        self.root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn predict_before_fit_fails() {
        let tree = DecisionTreeRegressor::new();
        assert!(!tree.is_fitted());
        assert_eq!(tree.predict(&[vec![1.0]]), Err(TsmlError::FitRequired));
    }

    #[test]
    fn step_function_is_learned_exactly() {
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..20).map(|i| if i < 10 { 1.0 } else { 5.0 }).collect();

        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&features, &targets).unwrap();

        assert_eq!(tree.depth(), Some(1));
        assert_eq!(tree.n_leaves(), Some(2));
        let pred = tree.predict(&[vec![3.0], vec![9.4], vec![9.6], vec![100.0]]).unwrap();
        assert_eq!(pred, vec![1.0, 1.0, 5.0, 5.0]);
    }

    #[test]
    fn picks_informative_feature() {
        // Feature 0 is noise, feature 1 determines the target
        let features: Vec<Vec<f64>> = (0..16)
            .map(|i| vec![((i * 7) % 5) as f64, (i % 2) as f64])
            .collect();
        let targets: Vec<f64> = (0..16).map(|i| if i % 2 == 0 { -3.0 } else { 3.0 }).collect();

        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&features, &targets).unwrap();

        let pred = tree.predict(&features).unwrap();
        for (p, t) in pred.iter().zip(targets.iter()) {
            assert_relative_eq!(p, t, epsilon = 1e-12);
        }
        assert_eq!(tree.depth(), Some(1));
    }

    #[test]
    fn unlimited_tree_interpolates_training_data() {
        let features: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i as f64).sin()]).collect();
        let targets: Vec<f64> = (0..30).map(|i| (i as f64 * 0.3).cos() * 10.0).collect();

        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&features, &targets).unwrap();
        let pred = tree.predict(&features).unwrap();
        for (p, t) in pred.iter().zip(targets.iter()) {
            assert_relative_eq!(p, t, epsilon = 1e-9);
        }
    }

    #[test]
    fn max_depth_limits_tree() {
        let features: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..64).map(|i| (i * i) as f64).collect();

        let mut tree = DecisionTreeRegressor::with_config(TreeConfig::default().with_max_depth(3));
        tree.fit(&features, &targets).unwrap();
        assert!(tree.depth().unwrap() <= 3);
        assert!(tree.n_leaves().unwrap() <= 8);
    }

    #[test]
    fn min_samples_leaf_respected() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let mut targets = vec![0.0; 10];
        targets[0] = 100.0;

        let config = TreeConfig::default().with_min_samples_leaf(3);
        let mut tree = DecisionTreeRegressor::with_config(config);
        tree.fit(&features, &targets).unwrap();

        // The outlier cannot be isolated in a leaf of its own
        let pred = tree.predict(&[vec![0.0]]).unwrap();
        assert!(pred[0] < 100.0);
    }

    #[test]
    fn constant_target_gives_single_leaf() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&features, &[4.2; 10]).unwrap();
        assert_eq!(tree.n_leaves(), Some(1));
        assert_eq!(tree.predict(&[vec![-5.0]]).unwrap(), vec![4.2]);
    }

    #[test]
    fn fit_validates_shapes() {
        let mut tree = DecisionTreeRegressor::new();
        assert_eq!(tree.fit(&[], &[]), Err(TsmlError::EmptyData));
        assert_eq!(
            tree.fit(&[vec![1.0, 2.0], vec![1.0]], &[1.0, 2.0]),
            Err(TsmlError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            tree.fit(&[vec![1.0], vec![2.0]], &[1.0]),
            Err(TsmlError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn predict_validates_feature_count() {
        let mut tree = DecisionTreeRegressor::new();
        tree.fit(&[vec![1.0, 2.0], vec![2.0, 1.0]], &[0.0, 1.0]).unwrap();
        assert_eq!(
            tree.predict(&[vec![1.0]]),
            Err(TsmlError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        );
    }
}
