//! In-memory row sources and the `(X, y)` training set.
//!
//! [`InMemoryRows`] hands out a pre-built `Vec` of records once.
//! [`LabeledFeatures`] pairs a transformed feature matrix with its labels and
//! serves contiguous mini-batches.

use std::ops::Range;

use ndarray::{s, Array2, ArrayView2};

use crate::dataset::RowSource;
use crate::error::{PipelineError, Result};

/// Records held in memory, handed out in order.
///
/// Each call to `read_rows` drains from where the previous call stopped.
pub struct InMemoryRows<R> {
    rows: Vec<R>,
    cursor: usize,
}

impl<R> InMemoryRows<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R: Clone> RowSource<R> for InMemoryRows<R> {
    fn read_rows(&mut self, limit: Option<usize>) -> Result<Vec<R>> {
        let remaining = self.rows.len() - self.cursor;
        let take = limit.map_or(remaining, |max| max.min(remaining));
        let out = self.rows[self.cursor..self.cursor + take].to_vec();
        self.cursor += take;
        Ok(out)
    }
}

/// Feature matrix paired with binary labels.
#[derive(Clone, Debug)]
pub struct LabeledFeatures {
    x: Array2<f64>,
    y: Vec<bool>,
}

impl LabeledFeatures {
    pub fn new(x: Array2<f64>, y: Vec<bool>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(PipelineError::Training(format!(
                "feature rows ({}) and labels ({}) must have same length",
                x.nrows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(PipelineError::Training("dataset is empty".into()));
        }
        if x.ncols() == 0 {
            return Err(PipelineError::Training("feature vectors are empty".into()));
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn labels(&self) -> &[bool] {
        &self.y
    }

    /// Share of positive labels.
    pub fn positive_rate(&self) -> f64 {
        self.y.iter().filter(|&&t| t).count() as f64 / self.y.len() as f64
    }

    /// Contiguous slice of rows and their labels.
    pub fn get_batch(&self, range: Range<usize>) -> (ArrayView2<'_, f64>, &[bool]) {
        let batch_x = self.x.slice(s![range.clone(), ..]);
        (batch_x, &self.y[range])
    }
}
