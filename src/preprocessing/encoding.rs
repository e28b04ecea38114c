//! One-hot encoding for categorical columns.
//!
//! The encoder learns the distinct observed values of one column in first-seen
//! order and assigns each a fixed index. At transform time a value becomes a
//! vector with a single 1 at its index. Missing values, and unseen values under
//! [`HandleUnknown::Ignore`], encode to all zeros and raise an
//! [`EncodingWarning`].

use std::fmt;

use crate::error::{PipelineError, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use crate::schema::{Column, FieldValue, Record};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Strategy for handling unknown categories during transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleUnknown {
    /// Raise an error when unknown categories are encountered.
    #[default]
    Error,
    /// Encode unknown categories as all zeros and report a warning.
    Ignore,
}

/// A recoverable anomaly met while encoding one row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingWarning {
    /// The value was not in the vocabulary learned at fit time.
    Unseen { column: Column, value: String },
    /// The value was missing.
    Missing { column: Column },
}

impl EncodingWarning {
    pub fn column(&self) -> Column {
        match self {
            EncodingWarning::Unseen { column, .. } | EncodingWarning::Missing { column } => *column,
        }
    }
}

impl fmt::Display for EncodingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingWarning::Unseen { column, value } => {
                write!(
                    f,
                    "unseen category {:?} in {}, encoded as all zeros",
                    value, column
                )
            }
            EncodingWarning::Missing { column } => {
                write!(f, "missing {}, encoded as all zeros", column)
            }
        }
    }
}

/// One-hot encoder for a categorical column.
#[derive(Clone, Debug, Default)]
pub struct OneHotEncoder {
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    /// Create a new OneHotEncoder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }

    pub fn handle_unknown(&self) -> HandleUnknown {
        self.handle_unknown
    }
}

/// Fitted OneHotEncoder ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    column: Column,
    /// Categories in first-seen order; the position is the output index.
    categories: Vec<String>,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    /// Categories learned at fit time, in output order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Output index of `category`, if it was seen at fit time.
    pub fn index_of(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }
}

impl Transformer for OneHotEncoder {
    type Fitted = FittedOneHotEncoder;

    fn fit<R: Record>(&self, column: Column, rows: &[R]) -> Result<FittedOneHotEncoder> {
        if rows.is_empty() {
            let msg = format!("cannot fit one-hot encoder for {column} on empty data");
            return Err(PipelineError::InvalidInput(msg));
        }

        // Vocabularies are a handful of entries, a linear scan beats hashing.
        let mut categories: Vec<String> = Vec::new();
        for row in rows {
            if let Some(key) = row.value(column).category_key() {
                if !categories.iter().any(|c| *c == key) {
                    categories.push(key.into_owned());
                }
            }
        }

        if categories.is_empty() {
            return Err(PipelineError::InvalidInput(format!(
                "cannot encode {}: all {} training values are missing",
                column,
                rows.len()
            )));
        }

        debug!(column = %column, ?categories, "fitted one-hot encoder");
        Ok(FittedOneHotEncoder {
            column,
            categories,
            handle_unknown: self.handle_unknown,
        })
    }
}

impl FittedTransformer for FittedOneHotEncoder {
    fn column(&self) -> Column {
        self.column
    }

    fn n_features_out(&self) -> usize {
        self.categories.len()
    }

    fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}={}", self.column, c))
            .collect()
    }

    fn transform_value(
        &self,
        value: &FieldValue<'_>,
        out: &mut Vec<f64>,
    ) -> Result<Option<EncodingWarning>> {
        let Some(key) = value.category_key() else {
            out.extend(std::iter::repeat(0.0).take(self.categories.len()));
            return Ok(Some(EncodingWarning::Missing {
                column: self.column,
            }));
        };

        match self.index_of(&key) {
            Some(index) => {
                let start = out.len();
                out.resize(start + self.categories.len(), 0.0);
                out[start + index] = 1.0;
                Ok(None)
            }
            None => match self.handle_unknown {
                HandleUnknown::Error => Err(PipelineError::UnknownCategory {
                    column: self.column,
                    value: key.into_owned(),
                }),
                HandleUnknown::Ignore => {
                    out.extend(std::iter::repeat(0.0).take(self.categories.len()));
                    Ok(Some(EncodingWarning::Unseen {
                        column: self.column,
                        value: key.into_owned(),
                    }))
                }
            },
        }
    }
}
