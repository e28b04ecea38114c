//! End-to-end batch runs.
//!
//! [`run`] executes the whole pipeline sequentially: load, fit, evaluate,
//! predict, write. A fit-time failure returns before anything is written.

use crate::config::PipelineConfig;
use crate::dataset::{CsvRowSource, FromRow, RowSource};
use crate::error::Result;
use crate::evaluation::{evaluate, Metrics};
use crate::pipeline::{SurvivalModel, SurvivalPipeline};
use crate::prediction::{write_submission_file, PredictionBatch, Predictor};
use crate::schema::{PassengerRecord, PredictionRecord};
use std::path::Path;
use tracing::info;

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// In-sample metrics on the training rows.
    pub metrics: Metrics,
    pub predictions: PredictionBatch,
    pub model: SurvivalModel,
}

fn load_rows<R: FromRow, P: AsRef<Path>>(path: P) -> Result<Vec<R>> {
    let rows = CsvRowSource::from_path(path.as_ref())?.read_rows(None)?;
    info!(path = %path.as_ref().display(), rows = rows.len(), "loaded rows");
    Ok(rows)
}

/// Fit on the training file, evaluate in-sample, predict the test file and
/// write the submission.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    config.validate()?;

    let train: Vec<PassengerRecord> = load_rows(&config.train_path)?;
    let model = SurvivalPipeline::new(config.trainer.clone()).fit(&train)?;
    let metrics = evaluate(&model, &train)?;

    if let Some(path) = &config.model_path {
        model.save_to_file(path)?;
    }

    let predictions = predict_file(config, &model)?;
    Ok(RunSummary {
        metrics,
        predictions,
        model,
    })
}

/// Score the test file with an already fitted model and write the submission.
pub fn predict_file(config: &PipelineConfig, model: &SurvivalModel) -> Result<PredictionBatch> {
    let test: Vec<PredictionRecord> = load_rows(&config.test_path)?;
    let batch = Predictor::new()
        .with_limit(config.prediction_limit)
        .predict_batch(model, &test)?;
    write_submission_file(&config.submission_path, &batch.rows)?;
    Ok(batch)
}
