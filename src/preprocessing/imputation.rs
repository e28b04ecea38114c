//! Simple Imputer.
//!
//! Replaces a missing numeric value with a statistic learned from the training
//! rows. Supports mean, median and constant strategies. The statistic is
//! computed once at fit time and reused unchanged at transform time.

use crate::error::{PipelineError, Result};
use crate::preprocessing::encoding::EncodingWarning;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::schema::{Column, FieldValue, Record};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Strategy for imputing missing values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace missing values with the mean of the observed values.
    #[default]
    Mean,
    /// Replace missing values with the median of the observed values.
    Median,
    /// Replace missing values with a constant value.
    Constant(f64),
}

/// SimpleImputer transformer (unfitted).
#[derive(Clone, Debug, Default)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
}

impl SimpleImputer {
    /// Create a new SimpleImputer with the specified strategy.
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }
}

/// Compute the fill value over the observed (non-missing) values.
///
/// Returns `None` for the data-derived strategies when nothing was observed.
fn compute_statistic(observed: &mut [f64], strategy: ImputeStrategy) -> Option<f64> {
    match strategy {
        ImputeStrategy::Constant(v) => Some(v),
        _ if observed.is_empty() => None,
        ImputeStrategy::Mean => Some(observed.iter().sum::<f64>() / observed.len() as f64),
        ImputeStrategy::Median => {
            observed.sort_by(f64::total_cmp);
            let n = observed.len();
            if n % 2 == 0 {
                Some((observed[n / 2 - 1] + observed[n / 2]) / 2.0)
            } else {
                Some(observed[n / 2])
            }
        }
    }
}

/// Fitted SimpleImputer ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedSimpleImputer {
    column: Column,
    strategy: ImputeStrategy,
    statistic: f64,
}

impl FittedSimpleImputer {
    /// The value substituted for a missing cell.
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn strategy(&self) -> ImputeStrategy {
        self.strategy
    }
}

impl Transformer for SimpleImputer {
    type Fitted = FittedSimpleImputer;

    fn fit<R: Record>(&self, column: Column, rows: &[R]) -> Result<FittedSimpleImputer> {
        if rows.is_empty() {
            let msg = format!("cannot fit imputer for {column} on empty data");
            return Err(PipelineError::InvalidInput(msg));
        }

        let mut observed = Vec::with_capacity(rows.len());
        for row in rows {
            let value = row.value(column);
            if value.is_missing() {
                continue;
            }
            let Some(v) = value.as_f64() else {
                let msg = format!("cannot impute non-numeric column {column}");
                return Err(PipelineError::InvalidInput(msg));
            };
            observed.push(v);
        }
        let n_missing = rows.len() - observed.len();

        let Some(statistic) = compute_statistic(&mut observed, self.strategy) else {
            return Err(PipelineError::InvalidInput(format!(
                "cannot impute {}: all {} training values are missing",
                column,
                rows.len()
            )));
        };

        debug!(column = %column, statistic, n_missing, "fitted imputer");
        Ok(FittedSimpleImputer {
            column,
            strategy: self.strategy,
            statistic,
        })
    }
}

impl FittedTransformer for FittedSimpleImputer {
    fn column(&self) -> Column {
        self.column
    }

    fn n_features_out(&self) -> usize {
        1
    }

    fn feature_names(&self) -> Vec<String> {
        vec![self.column.name().to_string()]
    }

    fn transform_value(
        &self,
        value: &FieldValue<'_>,
        out: &mut Vec<f64>,
    ) -> Result<Option<EncodingWarning>> {
        let v = match value {
            FieldValue::Missing => self.statistic,
            other => other.as_f64().ok_or_else(|| {
                let msg = format!("non-numeric value {other:?} in column {}", self.column);
                PipelineError::InvalidInput(msg)
            })?,
        };
        out.push(v);
        Ok(None)
    }
}
