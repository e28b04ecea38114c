//! Batch prediction and submission output.
//!
//! [`Predictor`] scores unlabeled rows in input order. An optional row limit
//! bounds the batch; rows beyond it are reported, never dropped silently.
//! Per-row encoding anomalies are collected as warnings and do not abort the
//! batch.

use crate::error::Result;
use crate::pipeline::SurvivalModel;
use crate::preprocessing::EncodingWarning;
use crate::schema::Record;
use csv::{Terminator, WriterBuilder};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Prediction for one passenger.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SubmissionRow {
    pub passenger_id: i64,
    pub survived: bool,
    pub probability: f64,
}

/// Output of [`Predictor::predict_batch`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PredictionBatch {
    /// One entry per scored row, in input order.
    pub rows: Vec<SubmissionRow>,
    /// Rows left unscored because of the limit.
    pub skipped: usize,
    /// Encoding warnings, tagged with the passenger id.
    pub warnings: Vec<(i64, EncodingWarning)>,
}

impl PredictionBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn survivors(&self) -> usize {
        self.rows.iter().filter(|r| r.survived).count()
    }
}

/// Scores batches of rows with a fitted model.
#[derive(Clone, Copy, Debug, Default)]
pub struct Predictor {
    limit: Option<usize>,
}

impl Predictor {
    /// A predictor with no row limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Score at most `limit` rows per batch (`None` for all).
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Score `rows` in order.
    pub fn predict_batch<R: Record>(
        &self,
        model: &SurvivalModel,
        rows: &[R],
    ) -> Result<PredictionBatch> {
        let take = self.limit.map_or(rows.len(), |max| max.min(rows.len()));
        let skipped = rows.len() - take;
        if skipped > 0 {
            warn!(
                limit = take,
                skipped,
                total = rows.len(),
                "prediction limit reached, remaining rows not scored"
            );
        }

        let mut batch = PredictionBatch {
            rows: Vec::with_capacity(take),
            skipped,
            warnings: Vec::new(),
        };
        for row in &rows[..take] {
            let id = row.passenger_id();
            let (result, warnings) = model.predict_with_warnings(row)?;
            for w in warnings {
                warn!(passenger_id = id, "{}", w);
                batch.warnings.push((id, w));
            }
            batch.rows.push(SubmissionRow {
                passenger_id: id,
                survived: result.survived,
                probability: result.probability,
            });
        }

        info!(
            scored = batch.len(),
            survivors = batch.survivors(),
            warnings = batch.warnings.len(),
            "predicted batch"
        );
        Ok(batch)
    }
}

/// Write `PassengerId,Survived` CSV with one `id,0|1` line per row.
pub fn write_submission<W: Write>(writer: W, rows: &[SubmissionRow]) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    wtr.write_record(["PassengerId", "Survived"])?;
    for row in rows {
        wtr.write_record([
            row.passenger_id.to_string(),
            if row.survived { "1" } else { "0" }.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render the submission in memory, then write it to `path` in one call.
///
/// The write is not atomic; an interrupted run can leave a partial file.
pub fn write_submission_file<P: AsRef<Path>>(path: P, rows: &[SubmissionRow]) -> Result<()> {
    let mut buffer = Vec::new();
    write_submission(&mut buffer, rows)?;
    std::fs::write(path.as_ref(), buffer)?;
    info!(path = %path.as_ref().display(), rows = rows.len(), "wrote submission");
    Ok(())
}
