//! Gradient boosted regression trees for binary classification.
//!
//! Each round fits a regression tree to the gradient of the logistic loss.
//! Leaf values are Newton steps, `-G / (H + λ)`, shrunk by the learning rate.
//! Trees grow leaf-wise: the leaf whose best split has the largest gain is
//! split next, until `max_leaves` is reached or no split improves the loss.
//!
//! # Gain Formula
//!
//! ```text
//! gain = G_L²/(H_L+λ) + G_R²/(H_R+λ) - G²/(H+λ)
//! ```

use crate::dataset::LabeledFeatures;
use crate::error::Result;
use crate::model::{invalid_param, sigmoid, BinaryClassifier, Trainer};
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::seq::index;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Smallest hessian used in a leaf or gain denominator.
const MIN_HESSIAN: f64 = 1e-16;

/// Base-score clamp so an all-positive or all-negative label set stays finite.
const RATE_EPSILON: f64 = 1e-6;

/// Hyperparameters of the boosting trainer.
///
/// Defaults:
/// - `n_trees`: 100
/// - `max_leaves`: 20
/// - `min_samples_leaf`: 10
/// - `learning_rate`: 0.2
/// - `l2_regularization`: 1.0
/// - `subsample`: 1.0
/// - `seed`: 0
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostingTrainer {
    pub n_trees: usize,
    pub max_leaves: usize,
    pub min_samples_leaf: usize,
    pub learning_rate: f64,
    pub l2_regularization: f64,
    /// Fraction of rows drawn (without replacement) for each tree.
    pub subsample: f64,
    pub seed: u64,
}

impl Default for GradientBoostingTrainer {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_leaves: 20,
            min_samples_leaf: 10,
            learning_rate: 0.2,
            l2_regularization: 1.0,
            subsample: 1.0,
            seed: 0,
        }
    }
}

impl GradientBoostingTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_trees(mut self, n: usize) -> Self {
        self.n_trees = n;
        self
    }

    pub fn max_leaves(mut self, n: usize) -> Self {
        self.max_leaves = n;
        self
    }

    pub fn min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn l2_regularization(mut self, l2: f64) -> Self {
        self.l2_regularization = l2;
        self
    }

    pub fn subsample(mut self, rate: f64) -> Self {
        self.subsample = rate;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let rate = self.learning_rate;
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(invalid_param("learning_rate", rate, "positive"));
        }
        if self.max_leaves < 2 {
            return Err(invalid_param("max_leaves", self.max_leaves, "at least 2"));
        }
        if self.min_samples_leaf == 0 {
            return Err(invalid_param("min_samples_leaf", 0, "at least 1"));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(invalid_param("subsample", self.subsample, "in (0, 1]"));
        }
        let l2 = self.l2_regularization;
        if !(l2 >= 0.0 && l2.is_finite()) {
            return Err(invalid_param("l2_regularization", l2, "non-negative"));
        }
        Ok(())
    }

    /// Rows used by the next tree, in ascending order.
    fn sample_rows(&self, n_rows: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        if self.subsample >= 1.0 {
            return (0..n_rows).collect();
        }
        let amount = ((n_rows as f64 * self.subsample).round() as usize).clamp(1, n_rows);
        let mut rows = index::sample(rng, n_rows, amount).into_vec();
        rows.sort_unstable();
        rows
    }
}

/// One node of a [`RegressionTree`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Rows with `x[feature] < threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

/// A regression tree stored as a flat node list; node 0 is the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    pub fn predict(&self, features: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().unwrap_or(f64::NAN);
                    // NaN compares false and goes right.
                    idx = if x < *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return *value,
                None => return 0.0,
            }
        }
    }
}

/// Fitted boosted ensemble.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    /// Log-odds of the training positive rate.
    base_score: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoostedTrees {
    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl BinaryClassifier for GradientBoostedTrees {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn raw_score(&self, features: ArrayView1<'_, f64>) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(features)).sum::<f64>()
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// A leaf still open for splitting.
struct OpenLeaf {
    node: usize,
    rows: Vec<usize>,
    split: Option<SplitCandidate>,
}

/// Per-tree growth state. Gradients are borrowed for one round only, so they
/// carry their own lifetime apart from the feature view.
struct TreeGrower<'d, 'g> {
    x: ArrayView2<'d, f64>,
    grad: &'g [f64],
    hess: &'g [f64],
    params: &'g GradientBoostingTrainer,
}

impl TreeGrower<'_, '_> {
    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        let g: f64 = rows.iter().map(|&r| self.grad[r]).sum();
        let h: f64 = rows.iter().map(|&r| self.hess[r]).sum();
        (g, h)
    }

    fn score(&self, g: f64, h: f64) -> f64 {
        g * g / (h + self.params.l2_regularization).max(MIN_HESSIAN)
    }

    fn leaf_value(&self, rows: &[usize]) -> f64 {
        let (g, h) = self.sums(rows);
        -g / (h + self.params.l2_regularization).max(MIN_HESSIAN) * self.params.learning_rate
    }

    /// Best split of `rows` over every feature, if any split has positive gain.
    fn best_split(&self, rows: &[usize]) -> Option<SplitCandidate> {
        let min_leaf = self.params.min_samples_leaf;
        if rows.len() < 2 * min_leaf {
            return None;
        }
        let (g_total, h_total) = self.sums(rows);
        let parent = self.score(g_total, h_total);

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = rows.to_vec();
        for feature in 0..self.x.ncols() {
            let col = self.x.column(feature);
            sorted.sort_by(|&a, &b| col[a].total_cmp(&col[b]));

            let (mut g_left, mut h_left) = (0.0, 0.0);
            for i in 0..sorted.len() - 1 {
                let r = sorted[i];
                g_left += self.grad[r];
                h_left += self.hess[r];

                let n_left = i + 1;
                if n_left < min_leaf {
                    continue;
                }
                if sorted.len() - n_left < min_leaf {
                    break;
                }
                let (lo, hi) = (col[r], col[sorted[i + 1]]);
                if lo >= hi {
                    continue;
                }

                let gain = self.score(g_left, h_left)
                    + self.score(g_total - g_left, h_total - h_left)
                    - parent;
                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: lo + (hi - lo) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }

    fn grow(&self, rows: Vec<usize>) -> RegressionTree {
        let mut nodes = vec![TreeNode::Leaf {
            value: self.leaf_value(&rows),
        }];
        let split = self.best_split(&rows);
        let mut open = vec![OpenLeaf {
            node: 0,
            rows,
            split,
        }];
        let mut n_leaves = 1;

        while n_leaves < self.params.max_leaves {
            let chosen = open
                .iter()
                .enumerate()
                .filter_map(|(i, leaf)| leaf.split.as_ref().map(|s| (i, s.gain)))
                .fold(None, |best: Option<(usize, f64)>, (i, gain)| match best {
                    Some((_, g)) if g >= gain => best,
                    _ => Some((i, gain)),
                });
            let Some((i, _)) = chosen else {
                break;
            };

            let leaf = open.swap_remove(i);
            let Some(split) = leaf.split else {
                break;
            };
            let col = self.x.column(split.feature);
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
                leaf.rows.iter().partition(|&&r| col[r] < split.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(TreeNode::Leaf {
                value: self.leaf_value(&left_rows),
            });
            nodes.push(TreeNode::Leaf {
                value: self.leaf_value(&right_rows),
            });
            nodes[leaf.node] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            let left_split = self.best_split(&left_rows);
            let right_split = self.best_split(&right_rows);
            open.push(OpenLeaf {
                node: left,
                rows: left_rows,
                split: left_split,
            });
            open.push(OpenLeaf {
                node: right,
                rows: right_rows,
                split: right_split,
            });
            n_leaves += 1;
        }

        RegressionTree { nodes }
    }
}

/// Mean logistic loss of raw scores against labels.
fn log_loss(scores: &[f64], labels: &[bool]) -> f64 {
    let total: f64 = scores
        .iter()
        .zip(labels)
        .map(|(&z, &t)| {
            let t = if t { 1.0 } else { 0.0 };
            z.max(0.0) - z * t + (-z.abs()).exp().ln_1p()
        })
        .sum();
    total / scores.len() as f64
}

impl Trainer for GradientBoostingTrainer {
    type Model = GradientBoostedTrees;

    fn fit(&self, features: &Array2<f64>, labels: &[bool]) -> Result<GradientBoostedTrees> {
        self.validate()?;
        let data = LabeledFeatures::new(features.to_owned(), labels.to_vec())?;
        let x = data.features();
        let y = data.labels();
        let n_rows = data.len();

        let rate = data.positive_rate().clamp(RATE_EPSILON, 1.0 - RATE_EPSILON);
        let base_score = (rate / (1.0 - rate)).ln();
        let mut scores = vec![base_score; n_rows];
        let mut grad = vec![0.0; n_rows];
        let mut hess = vec![0.0; n_rows];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);

        let mut trees = Vec::with_capacity(self.n_trees);
        for round in 0..self.n_trees {
            for i in 0..n_rows {
                let p = sigmoid(scores[i]);
                grad[i] = p - if y[i] { 1.0 } else { 0.0 };
                hess[i] = (p * (1.0 - p)).max(MIN_HESSIAN);
            }

            let rows = self.sample_rows(n_rows, &mut rng);
            let grower = TreeGrower {
                x,
                grad: &grad,
                hess: &hess,
                params: self,
            };
            let tree = grower.grow(rows);

            for (i, score) in scores.iter_mut().enumerate() {
                *score += tree.predict(x.row(i));
            }
            if round % 10 == 0 || round + 1 == self.n_trees {
                debug!(
                    round,
                    n_leaves = tree.n_leaves(),
                    loss = log_loss(&scores, y),
                    "boosting round"
                );
            }
            trees.push(tree);
        }

        info!(
            n_trees = trees.len(),
            n_rows,
            n_features = data.n_features(),
            base_score,
            loss = log_loss(&scores, y),
            "trained gradient boosted trees"
        );
        Ok(GradientBoostedTrees {
            base_score,
            trees,
            n_features: data.n_features(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    /// 40 rows: label is `x0 > 0.5`, `x1` is noise.
    fn step_data() -> (Array2<f64>, Vec<bool>) {
        let n = 40;
        let mut x = Array2::zeros((n, 2));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let x0 = i as f64 / n as f64;
            x[[i, 0]] = x0;
            x[[i, 1]] = ((i * 7) % 5) as f64;
            y.push(x0 > 0.5);
        }
        (x, y)
    }

    fn accuracy(model: &GradientBoostedTrees, x: &Array2<f64>, y: &[bool]) -> f64 {
        let correct = x
            .rows()
            .into_iter()
            .zip(y)
            .filter(|(row, &t)| model.predict(*row).survived == t)
            .count();
        correct as f64 / y.len() as f64
    }

    #[test]
    fn test_learns_step_function() {
        let (x, y) = step_data();
        let model = GradientBoostingTrainer::new()
            .n_trees(20)
            .min_samples_leaf(2)
            .fit(&x, &y)
            .unwrap();
        assert_eq!(model.trees().len(), 20);
        assert_eq!(accuracy(&model, &x, &y), 1.0);

        let first = &model.trees()[0];
        match &first.nodes()[0] {
            TreeNode::Split {
                feature, threshold, ..
            } => {
                assert_eq!(*feature, 0);
                assert!(*threshold > 0.5 && *threshold < 0.55);
            }
            other => panic!("expected a root split, got {other:?}"),
        }
    }

    #[test]
    fn test_gradients_refresh_each_round() {
        let (x, y) = step_data();
        let model = GradientBoostingTrainer::new()
            .n_trees(2)
            .min_samples_leaf(2)
            .fit(&x, &y)
            .unwrap();
        let first = model.trees()[0].predict(x.row(0));
        let second = model.trees()[1].predict(x.row(0));
        assert!(first < 0.0 && second < 0.0);
        // Residuals shrink once the first tree is applied.
        assert!(second.abs() < first.abs());
    }

    #[test]
    fn test_base_score_is_log_odds() {
        let (x, y) = step_data();
        let model = GradientBoostingTrainer::new()
            .n_trees(1)
            .fit(&x, &y)
            .unwrap();
        let p = y.iter().filter(|&&t| t).count() as f64 / y.len() as f64;
        assert_abs_diff_eq!(model.base_score(), (p / (1.0 - p)).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_max_leaves_bound() {
        let (x, y) = step_data();
        let model = GradientBoostingTrainer::new()
            .n_trees(5)
            .max_leaves(3)
            .min_samples_leaf(1)
            .fit(&x, &y)
            .unwrap();
        assert!(model.trees().iter().all(|t| t.n_leaves() <= 3));
    }

    #[test]
    fn test_min_samples_leaf_blocks_splits() {
        let (x, y) = step_data();
        let model = GradientBoostingTrainer::new()
            .n_trees(3)
            .min_samples_leaf(30)
            .fit(&x, &y)
            .unwrap();
        assert!(model.trees().iter().all(|t| t.n_leaves() == 1));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let (x, y) = step_data();
        let trainer = GradientBoostingTrainer::new()
            .n_trees(10)
            .subsample(0.7)
            .min_samples_leaf(2)
            .seed(17);
        let a = trainer.fit(&x, &y).unwrap();
        let b = trainer.fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_class_labels() {
        let x = array![[1.0], [2.0], [3.0]];
        let model = GradientBoostingTrainer::new()
            .n_trees(5)
            .fit(&x, &[true, true, true])
            .unwrap();
        let p = model.probability(x.row(0));
        assert!(p > 0.99 && p <= 1.0);
    }

    #[test]
    fn test_probability_in_unit_interval() {
        let (x, y) = step_data();
        let model = GradientBoostingTrainer::new()
            .min_samples_leaf(1)
            .learning_rate(1.0)
            .fit(&x, &y)
            .unwrap();
        for row in x.rows() {
            let p = model.probability(row);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_contract_errors() {
        let x = array![[1.0], [2.0]];
        assert!(matches!(
            GradientBoostingTrainer::new().fit(&x, &[true]),
            Err(PipelineError::Training(_))
        ));

        let empty = Array2::<f64>::zeros((0, 1));
        assert!(matches!(
            GradientBoostingTrainer::new().fit(&empty, &[]),
            Err(PipelineError::Training(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_hyperparameters() {
        assert!(GradientBoostingTrainer::new().validate().is_ok());
        let bad = [
            GradientBoostingTrainer::new().learning_rate(0.0),
            GradientBoostingTrainer::new().max_leaves(1),
            GradientBoostingTrainer::new().min_samples_leaf(0),
            GradientBoostingTrainer::new().subsample(0.0),
            GradientBoostingTrainer::new().subsample(1.5),
            GradientBoostingTrainer::new().l2_regularization(-1.0),
        ];
        for trainer in bad {
            assert!(trainer.validate().is_err(), "{trainer:?}");
        }
    }

    #[test]
    fn test_tree_predict_routing() {
        let tree = RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 1,
                    threshold: 2.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: -1.0 },
                TreeNode::Leaf { value: 1.0 },
            ],
        };
        assert_eq!(tree.predict(array![0.0, 2.0].view()), -1.0);
        assert_eq!(tree.predict(array![0.0, 2.5].view()), 1.0);
        assert_eq!(tree.n_leaves(), 2);
    }
}
