//! Binary classifiers and their trainers.
//!
//! A [`Trainer`] fits on a feature matrix and boolean labels and returns an
//! immutable [`BinaryClassifier`]. Two are provided:
//!
//! - [`GradientBoostingTrainer`]: gradient boosted regression trees on the
//!   logistic loss (the default).
//! - [`LogisticRegressionTrainer`]: mini-batch gradient descent on
//!   binary cross-entropy.
//!
//! [`TrainerConfig`] selects one from configuration and [`Classifier`] wraps
//! whichever model it produced.

use crate::error::{PipelineError, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

pub mod gbdt;
pub mod logistic;

pub use gbdt::{GradientBoostedTrees, GradientBoostingTrainer, RegressionTree, TreeNode};
pub use logistic::{LogisticRegression, LogisticRegressionTrainer};

/// Probability above which a passenger is predicted to survive.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Outcome of scoring one feature vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub survived: bool,
    /// Probability of survival in `[0, 1]`.
    pub probability: f64,
}

impl PredictionResult {
    /// Threshold a raw log-odds score.
    pub fn from_score(score: f64) -> Self {
        let probability = sigmoid(score);
        Self {
            survived: probability > DECISION_THRESHOLD,
            probability,
        }
    }
}

/// A fitted binary classifier.
///
/// Scoring never mutates the model, so one instance can serve any number of
/// concurrent callers.
pub trait BinaryClassifier: Send + Sync {
    /// Length of the feature vectors the model was fitted on.
    fn n_features(&self) -> usize;

    /// Raw log-odds score.
    fn raw_score(&self, features: ArrayView1<'_, f64>) -> f64;

    fn probability(&self, features: ArrayView1<'_, f64>) -> f64 {
        sigmoid(self.raw_score(features))
    }

    fn predict(&self, features: ArrayView1<'_, f64>) -> PredictionResult {
        PredictionResult::from_score(self.raw_score(features))
    }
}

/// Fits a binary classifier on `(features, labels)`.
pub trait Trainer {
    type Model: BinaryClassifier;

    /// # Errors
    /// Returns [`PipelineError::Training`] when `features` and `labels` differ
    /// in length, when there are no rows, or when rows have no features.
    fn fit(&self, features: &Array2<f64>, labels: &[bool]) -> Result<Self::Model>;
}

/// Any fitted model this crate can train.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Classifier {
    GradientBoosting(GradientBoostedTrees),
    Logistic(LogisticRegression),
}

impl Classifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::GradientBoosting(_) => "gbdt",
            Classifier::Logistic(_) => "logistic",
        }
    }
}

impl BinaryClassifier for Classifier {
    fn n_features(&self) -> usize {
        match self {
            Classifier::GradientBoosting(m) => m.n_features(),
            Classifier::Logistic(m) => m.n_features(),
        }
    }

    fn raw_score(&self, features: ArrayView1<'_, f64>) -> f64 {
        match self {
            Classifier::GradientBoosting(m) => m.raw_score(features),
            Classifier::Logistic(m) => m.raw_score(features),
        }
    }
}

impl From<GradientBoostedTrees> for Classifier {
    fn from(model: GradientBoostedTrees) -> Self {
        Classifier::GradientBoosting(model)
    }
}

impl From<LogisticRegression> for Classifier {
    fn from(model: LogisticRegression) -> Self {
        Classifier::Logistic(model)
    }
}

/// Trainer selection, tagged by `kind` in configuration files.
///
/// ```
/// use titanic_survival::model::TrainerConfig;
///
/// let cfg: TrainerConfig = serde_json::from_str(r#"{"kind": "logistic", "max_epochs": 50}"#).unwrap();
/// assert!(matches!(cfg, TrainerConfig::Logistic(ref t) if t.max_epochs == 50));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainerConfig {
    Gbdt(GradientBoostingTrainer),
    Logistic(LogisticRegressionTrainer),
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig::Gbdt(GradientBoostingTrainer::default())
    }
}

impl TrainerConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            TrainerConfig::Gbdt(_) => "gbdt",
            TrainerConfig::Logistic(_) => "logistic",
        }
    }

    /// Replace the random seed; the logistic trainer is deterministic and has none.
    pub fn with_seed(self, seed: u64) -> Self {
        match self {
            TrainerConfig::Gbdt(t) => TrainerConfig::Gbdt(t.seed(seed)),
            other => other,
        }
    }

    /// Reject hyperparameters no trainer can run with.
    pub fn validate(&self) -> Result<()> {
        match self {
            TrainerConfig::Gbdt(t) => t.validate(),
            TrainerConfig::Logistic(t) => t.validate(),
        }
    }

    pub fn fit(&self, features: &Array2<f64>, labels: &[bool]) -> Result<Classifier> {
        match self {
            TrainerConfig::Gbdt(t) => t.fit(features, labels).map(Classifier::from),
            TrainerConfig::Logistic(t) => t.fit(features, labels).map(Classifier::from),
        }
    }
}

pub(crate) fn invalid_param(
    name: &str,
    value: impl std::fmt::Display,
    rule: &str,
) -> PipelineError {
    PipelineError::InvalidInput(format!("{name} must be {rule}, got {value}"))
}
