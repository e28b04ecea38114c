//! Survival pipeline: transformer chain plus classifier.
//!
//! [`SurvivalPipeline`] holds the unfitted configuration. Fitting it returns a
//! [`SurvivalModel`], an immutable value that owns the fitted chain (learned
//! imputation mean and category vocabularies) and the trained classifier.
//! Nothing is kept in global state, so a model can be cloned, persisted, or
//! shared between threads freely.

use crate::dataset::FromRow;
use crate::error::{PipelineError, Result};
use crate::model::{BinaryClassifier, Classifier, PredictionResult, TrainerConfig};
use crate::preprocessing::{ColumnTransformer, EncodingWarning, FittedColumnTransformer};
use crate::schema::{PassengerRecord, Record};
use crate::serialization;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Unfitted pipeline configuration.
#[derive(Clone, Debug)]
pub struct SurvivalPipeline {
    chain: ColumnTransformer,
    trainer: TrainerConfig,
}

impl Default for SurvivalPipeline {
    fn default() -> Self {
        Self::new(TrainerConfig::default())
    }
}

impl SurvivalPipeline {
    /// The passenger chain with the given trainer.
    pub fn new(trainer: TrainerConfig) -> Self {
        Self {
            chain: ColumnTransformer::passenger_default(),
            trainer,
        }
    }

    /// Replace the transformer chain.
    pub fn with_chain(mut self, chain: ColumnTransformer) -> Self {
        self.chain = chain;
        self
    }

    pub fn trainer(&self) -> &TrainerConfig {
        &self.trainer
    }

    /// Fit the chain on `rows`, transform them, and train the classifier.
    ///
    /// Any failure aborts the fit; no partial model is returned.
    pub fn fit(&self, rows: &[PassengerRecord]) -> Result<SurvivalModel> {
        self.trainer.validate()?;
        let chain = self.chain.fit(PassengerRecord::schema(), rows)?;
        let features = chain.transform_batch(rows)?;
        let labels: Vec<bool> = rows.iter().map(|r| r.survived).collect();

        let classifier = self.trainer.fit(&features, &labels)?;
        info!(
            rows = rows.len(),
            n_features = chain.n_features_out(),
            trainer = classifier.kind(),
            "fitted survival model"
        );
        Ok(SurvivalModel { chain, classifier })
    }
}

/// A fitted pipeline ready for inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurvivalModel {
    chain: FittedColumnTransformer,
    classifier: Classifier,
}

impl SurvivalModel {
    pub fn new(chain: FittedColumnTransformer, classifier: Classifier) -> Result<Self> {
        check_features(chain.n_features_out(), classifier.n_features())?;
        Ok(Self { chain, classifier })
    }

    pub fn chain(&self) -> &FittedColumnTransformer {
        &self.chain
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Score an already transformed feature vector.
    pub fn predict_features(&self, features: ArrayView1<'_, f64>) -> Result<PredictionResult> {
        check_features(self.classifier.n_features(), features.len())?;
        Ok(self.classifier.predict(features))
    }

    /// Transform and score one row.
    pub fn predict<R: Record + ?Sized>(&self, row: &R) -> Result<PredictionResult> {
        let features = self.chain.transform(row)?;
        self.predict_features(features.view())
    }

    /// Transform and score one row, returning encoding warnings instead of
    /// logging them.
    pub fn predict_with_warnings<R: Record + ?Sized>(
        &self,
        row: &R,
    ) -> Result<(PredictionResult, Vec<EncodingWarning>)> {
        let (features, warnings) = self.chain.transform_with_warnings(row)?;
        Ok((self.predict_features(features.view())?, warnings))
    }

    /// Save the model to a file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serialization::save_to_file(self, path.as_ref())?;
        info!(path = %path.as_ref().display(), "saved model");
        Ok(())
    }

    /// Load a model saved with [`save_to_file`](Self::save_to_file).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model: SurvivalModel = serialization::load_from_file(path.as_ref())?;
        check_features(model.chain.n_features_out(), model.classifier.n_features())?;
        info!(path = %path.as_ref().display(), trainer = model.classifier.kind(), "loaded model");
        Ok(model)
    }
}

fn check_features(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(PipelineError::FeatureMismatch {
            expected_features: expected,
            got_features: got,
        });
    }
    Ok(())
}
