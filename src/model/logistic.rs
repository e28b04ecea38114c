//! Logistic regression trained with mini-batch gradient descent.
//!
//! The loss is binary cross-entropy on logits; its gradient with respect to
//! the logit is `sigmoid(z) - t`. Gradients are averaged per batch before the
//! L2 penalty is added. Rows are visited in order, so training is
//! deterministic.

use crate::dataset::LabeledFeatures;
use crate::error::{PipelineError, Result};
use crate::model::{invalid_param, sigmoid, BinaryClassifier, Trainer};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Hyperparameters of the logistic trainer.
///
/// Defaults:
/// - `learning_rate`: 0.01
/// - `max_epochs`: 200
/// - `batch_size`: 32
/// - `l2`: 0.0
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionTrainer {
    pub learning_rate: f64,
    pub max_epochs: usize,
    pub batch_size: usize,
    /// L2 penalty on the weights (the bias is not penalized).
    pub l2: f64,
}

impl Default for LogisticRegressionTrainer {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            max_epochs: 200,
            batch_size: 32,
            l2: 0.0,
        }
    }
}

impl LogisticRegressionTrainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let rate = self.learning_rate;
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(invalid_param("learning_rate", rate, "positive"));
        }
        if self.batch_size == 0 {
            return Err(invalid_param("batch_size", 0, "at least 1"));
        }
        if !(self.l2 >= 0.0 && self.l2.is_finite()) {
            return Err(invalid_param("l2", self.l2, "non-negative"));
        }
        Ok(())
    }
}

/// Fitted logistic model: `z = w·x + b`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Array1<f64>,
    bias: f64,
}

impl LogisticRegression {
    pub fn new(weights: Array1<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl BinaryClassifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn raw_score(&self, features: ArrayView1<'_, f64>) -> f64 {
        features.dot(&self.weights) + self.bias
    }
}

impl Trainer for LogisticRegressionTrainer {
    type Model = LogisticRegression;

    fn fit(&self, features: &Array2<f64>, labels: &[bool]) -> Result<LogisticRegression> {
        self.validate()?;
        let data = LabeledFeatures::new(features.to_owned(), labels.to_vec())?;
        let n_total = data.len();

        let mut weights = Array1::<f64>::zeros(data.n_features());
        let mut bias = 0.0;

        for epoch in 0..self.max_epochs {
            let mut total_loss = 0.0;
            for start in (0..n_total).step_by(self.batch_size) {
                let end = (start + self.batch_size).min(n_total);
                let (batch_x, batch_y) = data.get_batch(start..end);
                let m = (end - start) as f64;

                let logits = batch_x.dot(&weights) + bias;
                let targets: Array1<f64> = batch_y
                    .iter()
                    .map(|&t| if t { 1.0 } else { 0.0 })
                    .collect();

                total_loss += logits
                    .iter()
                    .zip(targets.iter())
                    .map(|(&z, &t)| z.max(0.0) - z * t + (-z.abs()).exp().ln_1p())
                    .sum::<f64>();

                let residual = logits.mapv(sigmoid) - &targets;
                let grad_w = batch_x.t().dot(&residual) / m + &weights * self.l2;
                let grad_b = residual.sum() / m;

                weights.scaled_add(-self.learning_rate, &grad_w);
                bias -= self.learning_rate * grad_b;
            }

            let avg_loss = total_loss / n_total as f64;
            if !avg_loss.is_finite() {
                let msg = format!("loss diverged at epoch {epoch}");
                return Err(PipelineError::Training(msg));
            }
            if epoch % 50 == 0 {
                debug!(epoch, loss = avg_loss, "logistic epoch");
            }
        }

        info!(
            epochs = self.max_epochs,
            n_rows = n_total,
            n_features = data.n_features(),
            "trained logistic regression"
        );
        Ok(LogisticRegression { weights, bias })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Vec<bool>) {
        let x = array![
            [0.0, 1.0],
            [0.1, 0.9],
            [0.2, 1.0],
            [0.3, 0.8],
            [0.7, 0.2],
            [0.8, 0.0],
            [0.9, 0.1],
            [1.0, 0.0],
        ];
        let y = vec![false, false, false, false, true, true, true, true];
        (x, y)
    }

    #[test]
    fn test_learns_separable_data() {
        let (x, y) = separable();
        let model = LogisticRegressionTrainer::new()
            .learning_rate(0.5)
            .max_epochs(500)
            .batch_size(4)
            .fit(&x, &y)
            .unwrap();
        for (row, &t) in x.rows().into_iter().zip(&y) {
            assert_eq!(model.predict(row).survived, t);
        }
        assert!(model.weights()[0] > 0.0);
        assert!(model.weights()[1] < 0.0);
    }

    #[test]
    fn test_zero_epochs_gives_half() {
        let (x, y) = separable();
        let model = LogisticRegressionTrainer::new()
            .max_epochs(0)
            .fit(&x, &y)
            .unwrap();
        assert_abs_diff_eq!(model.probability(x.row(0)), 0.5);
        assert!(!model.predict(x.row(0)).survived);
    }

    #[test]
    fn test_l2_shrinks_weights() {
        let (x, y) = separable();
        let trainer = LogisticRegressionTrainer::new()
            .learning_rate(0.5)
            .max_epochs(300);
        let plain = trainer.clone().fit(&x, &y).unwrap();
        let shrunk = trainer.l2(0.5).fit(&x, &y).unwrap();
        assert!(shrunk.weights()[0].abs() < plain.weights()[0].abs());
    }

    #[test]
    fn test_deterministic() {
        let (x, y) = separable();
        let trainer = LogisticRegressionTrainer::new()
            .max_epochs(20)
            .batch_size(3);
        assert_eq!(trainer.fit(&x, &y).unwrap(), trainer.fit(&x, &y).unwrap());
    }

    #[test]
    fn test_raw_score() {
        let model = LogisticRegression::new(array![2.0, -1.0], 0.5);
        assert_abs_diff_eq!(model.raw_score(array![1.0, 3.0].view()), -0.5);
        assert_eq!(model.n_features(), 2);
    }

    #[test]
    fn test_contract_errors() {
        let (x, _) = separable();
        assert!(matches!(
            LogisticRegressionTrainer::new().fit(&x, &[true]),
            Err(PipelineError::Training(_))
        ));
        let bad = [
            LogisticRegressionTrainer::new().batch_size(0),
            LogisticRegressionTrainer::new().learning_rate(-1.0),
            LogisticRegressionTrainer::new().l2(f64::NAN),
        ];
        for trainer in &bad {
            assert!(trainer.validate().is_err(), "{trainer:?}");
        }
    }
}
