//! Passenger survival classification.
//!
//! A small tabular ML pipeline:
//!
//! - [`dataset`] reads CSV rows into typed records bound to an explicit [`schema`]
//! - [`preprocessing`] turns a record into a numeric vector through a fitted
//!   column transformer chain (drop, impute, one-hot, concatenate)
//! - [`model`] holds the classifiers: gradient boosted trees and a logistic
//!   regression baseline
//! - [`pipeline`] ties chain and classifier into one fitted [`SurvivalModel`]
//! - [`evaluation`] and [`prediction`] score labeled and unlabeled rows
//! - [`runner`] runs the whole thing from a [`PipelineConfig`]
//!
//! ```no_run
//! use titanic_survival::{runner, PipelineConfig};
//!
//! let summary = runner::run(&PipelineConfig::default())?;
//! println!("{}", summary.metrics);
//! # Ok::<(), titanic_survival::PipelineError>(())
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod pipeline;
pub mod prediction;
pub mod preprocessing;
pub mod runner;
pub mod schema;
pub mod serialization;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use evaluation::{evaluate, ConfusionMatrix, Metrics};
pub use model::{BinaryClassifier, Classifier, PredictionResult, TrainerConfig};
pub use pipeline::{SurvivalModel, SurvivalPipeline};
pub use prediction::{PredictionBatch, Predictor, SubmissionRow};
pub use schema::{PassengerRecord, PredictionRecord, Record};
