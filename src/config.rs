//! Run configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config file.
//! Command-line flags are applied on top of the file.
//!
//! ```json
//! {
//!   "train_path": "Data/train.csv",
//!   "test_path": "Data/test.csv",
//!   "submission_path": "Data/submission.csv",
//!   "model_path": "Data/model.bin",
//!   "prediction_limit": null,
//!   "trainer": { "kind": "gbdt", "n_trees": 100, "seed": 0 }
//! }
//! ```

use crate::error::{PipelineError, Result};
use crate::model::TrainerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Labeled rows used to fit and evaluate the model.
    pub train_path: PathBuf,
    /// Unlabeled rows to predict.
    pub test_path: PathBuf,
    pub submission_path: PathBuf,
    /// Where to save the fitted model; not saved when unset.
    pub model_path: Option<PathBuf>,
    /// Maximum number of test rows to score; all rows when unset.
    pub prediction_limit: Option<usize>,
    pub trainer: TrainerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("Data/train.csv"),
            test_path: PathBuf::from("Data/test.csv"),
            submission_path: PathBuf::from("Data/submission.csv"),
            model_path: None,
            prediction_limit: None,
            trainer: TrainerConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prediction_limit == Some(0) {
            let msg = "prediction_limit must be at least 1 when set";
            return Err(PipelineError::InvalidInput(msg.into()));
        }
        self.trainer.validate()
    }
}
