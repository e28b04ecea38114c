//! Classification metrics over labeled rows.
//!
//! [`evaluate`] re-transforms rows through the model's fitted chain (it never
//! refits) and compares each prediction with the row's label. The binary runs
//! it on the training rows, so the numbers are in-sample and optimistic.

use crate::error::{PipelineError, Result};
use crate::pipeline::SurvivalModel;
use crate::schema::PassengerRecord;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Counts of prediction outcomes, with `Survived = true` as the positive class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Tally predictions against targets pairwise.
    pub fn from_predictions(predictions: &[bool], targets: &[bool]) -> Self {
        predictions
            .iter()
            .zip(targets)
            .fold(Self::default(), |mut m, (&pred, &actual)| {
                match (pred, actual) {
                    (true, true) => m.true_positives += 1,
                    (false, false) => m.true_negatives += 1,
                    (true, false) => m.false_positives += 1,
                    (false, true) => m.false_negatives += 1,
                }
                m
            })
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }
}

/// Aggregate metrics. Ratios with a zero denominator are 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl Metrics {
    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        let tp = confusion.true_positives;
        let accuracy = ratio(tp + confusion.true_negatives, confusion.total());
        let precision = ratio(tp, tp + confusion.false_positives);
        let recall = ratio(tp, tp + confusion.false_negatives);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            accuracy,
            precision,
            recall,
            f1,
            confusion,
        }
    }

    /// # Errors
    /// [`PipelineError::InvalidInput`] when the slices are empty or differ in length.
    pub fn from_predictions(predictions: &[bool], targets: &[bool]) -> Result<Self> {
        if predictions.len() != targets.len() {
            return Err(PipelineError::InvalidInput(format!(
                "{} predictions for {} targets",
                predictions.len(),
                targets.len()
            )));
        }
        if predictions.is_empty() {
            let msg = "cannot compute metrics over zero rows";
            return Err(PipelineError::InvalidInput(msg.into()));
        }
        let confusion = ConfusionMatrix::from_predictions(predictions, targets);
        Ok(Self::from_confusion(confusion))
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy:  {:.1}%", self.accuracy * 100.0)?;
        writeln!(f, "Precision: {:.1}%", self.precision * 100.0)?;
        writeln!(f, "Recall:    {:.1}%", self.recall * 100.0)?;
        write!(f, "F1 Score:  {:.1}%", self.f1 * 100.0)
    }
}

/// Score `rows` with `model` and compare against their labels.
pub fn evaluate(model: &SurvivalModel, rows: &[PassengerRecord]) -> Result<Metrics> {
    let predictions = rows
        .iter()
        .map(|row| model.predict(row).map(|r| r.survived))
        .collect::<Result<Vec<bool>>>()?;
    let targets: Vec<bool> = rows.iter().map(|r| r.survived).collect();

    let metrics = Metrics::from_predictions(&predictions, &targets)?;
    info!(
        rows = rows.len(),
        accuracy = metrics.accuracy,
        f1 = metrics.f1,
        "evaluated model"
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SurvivalPipeline;
    use crate::testing::train_rows;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_confusion_counts() {
        let preds = [true, true, false, false, true];
        let targets = [true, false, false, true, true];
        let m = ConfusionMatrix::from_predictions(&preds, &targets);
        assert_eq!(m.true_positives, 2);
        assert_eq!(m.false_positives, 1);
        assert_eq!(m.true_negatives, 1);
        assert_eq!(m.false_negatives, 1);
        assert_eq!(m.total(), 5);
    }

    #[test]
    fn test_metrics_values() {
        let preds = [true, true, false, false, true];
        let targets = [true, false, false, true, true];
        let m = Metrics::from_predictions(&preds, &targets).unwrap();
        assert_abs_diff_eq!(m.accuracy, 0.6);
        assert_abs_diff_eq!(m.precision, 2.0 / 3.0);
        assert_abs_diff_eq!(m.recall, 2.0 / 3.0);
        assert_abs_diff_eq!(m.f1, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_f1_zero_without_positive_predictions() {
        let m = Metrics::from_predictions(&[false, false], &[true, false]).unwrap();
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        assert_abs_diff_eq!(m.accuracy, 0.5);
    }

    #[test]
    fn test_f1_zero_without_actual_positives() {
        let m = Metrics::from_predictions(&[true, false], &[false, false]).unwrap();
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
    }

    #[test]
    fn test_empty_and_mismatched() {
        assert!(Metrics::from_predictions(&[], &[]).is_err());
        assert!(Metrics::from_predictions(&[true], &[]).is_err());
    }

    #[test]
    fn test_in_sample_evaluation() {
        let rows = train_rows();
        let model = SurvivalPipeline::default().fit(&rows).unwrap();
        let metrics = evaluate(&model, &rows).unwrap();
        assert_eq!(metrics.confusion.total(), rows.len());
        // Gender alone gets 36 of these 46 rows right.
        assert!(metrics.accuracy >= 0.75, "accuracy {}", metrics.accuracy);
        assert!(metrics.f1 > 0.0 && metrics.f1 <= 1.0);
    }

    #[test]
    fn test_display() {
        let m = Metrics::from_predictions(&[true], &[true]).unwrap();
        let text = m.to_string();
        assert!(text.contains("Accuracy:  100.0%"));
        assert!(text.contains("F1 Score:  100.0%"));
    }
}
