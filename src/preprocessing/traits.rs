//! Core traits for per-column transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; holds hyperparameters and learns from
//!   one named column of the training rows.
//! - [`FittedTransformer`]: After fitting; immutable, ready for inference and
//!   serialization.

use crate::error::Result;
use crate::preprocessing::encoding::EncodingWarning;
use crate::schema::{Column, FieldValue, Record};

/// Trait for unfitted column transformers.
///
/// A transformer reads one column of every training row by name and learns
/// whatever state it needs (an imputation statistic, a category vocabulary).
///
/// # Example
/// ```
/// use titanic_survival::preprocessing::{ImputeStrategy, SimpleImputer, Transformer, FittedTransformer};
/// use titanic_survival::schema::{Column, FieldValue, PredictionRecord};
///
/// # fn row(age: Option<f64>) -> PredictionRecord {
/// #     PredictionRecord {
/// #         passenger_id: 1, passenger_class: Some(3), name: "A".into(), gender: Some("male".into()),
/// #         age, siblings_or_spouses: 0, parents_or_children: 0, ticket: "T".into(),
/// #         fare: None, cabin: None, embarked: None,
/// #     }
/// # }
/// let rows = vec![row(Some(20.0)), row(None), row(Some(30.0))];
/// let fitted = SimpleImputer::new(ImputeStrategy::Mean).fit(Column::Age, &rows).unwrap();
///
/// let mut out = Vec::new();
/// fitted.transform_value(&FieldValue::Missing, &mut out).unwrap();
/// assert_eq!(out, vec![25.0]);
/// ```
pub trait Transformer: Clone {
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer;

    /// Fit the transformer to `column` of the training rows.
    ///
    /// # Errors
    /// Returns [`PipelineError::InvalidInput`](crate::error::PipelineError::InvalidInput) if:
    /// - `rows` is empty
    /// - The column holds no usable values
    fn fit<R: Record>(&self, column: Column, rows: &[R]) -> Result<Self::Fitted>;
}

/// Trait for fitted column transformers.
///
/// Fitted state is read-only, so a fitted transformer can be shared between
/// threads and called concurrently.
pub trait FittedTransformer: Clone + Send + Sync {
    /// The column this transformer was fitted on.
    fn column(&self) -> Column;

    /// Number of features this column contributes to the feature vector.
    fn n_features_out(&self) -> usize;

    /// One name per output feature, in output order.
    fn feature_names(&self) -> Vec<String>;

    /// Append the encoding of `value` to `out`.
    ///
    /// Exactly [`n_features_out`](Self::n_features_out) values are appended on
    /// success. Recoverable anomalies (missing or unseen categories) are returned
    /// as a warning instead of an error.
    fn transform_value(
        &self,
        value: &FieldValue<'_>,
        out: &mut Vec<f64>,
    ) -> Result<Option<EncodingWarning>>;
}
