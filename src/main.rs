//! Survival classifier runner.
//!
//! Usage:
//!   titanic-survival
//!   titanic-survival --config run.json --limit 2000
//!   titanic-survival --trainer logistic --save-model Data/model.bin
//!   titanic-survival predict --model Data/model.bin

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use titanic_survival::config::PipelineConfig;
use titanic_survival::model::{GradientBoostingTrainer, LogisticRegressionTrainer, TrainerConfig};
use titanic_survival::pipeline::SurvivalModel;
use titanic_survival::prediction::{PredictionBatch, SubmissionRow};
use titanic_survival::{runner, PipelineError};

#[derive(Parser)]
#[command(
    name = "titanic-survival",
    about = "Train a survival classifier and write predictions"
)]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Labeled training CSV.
    #[arg(long)]
    train: Option<PathBuf>,

    /// Unlabeled CSV to predict.
    #[arg(long)]
    test: Option<PathBuf>,

    /// Submission CSV to write.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Score at most this many test rows.
    #[arg(long)]
    limit: Option<usize>,

    /// Classifier to train.
    #[arg(long, value_enum)]
    trainer: Option<TrainerKind>,

    /// Random seed for the boosting trainer.
    #[arg(long)]
    seed: Option<u64>,

    /// Save the fitted model to this path.
    #[arg(long)]
    save_model: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Score the test CSV with a saved model instead of training.
    Predict {
        #[arg(long)]
        model: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TrainerKind {
    Gbdt,
    Logistic,
}

impl Cli {
    fn into_config(self) -> Result<(PipelineConfig, Option<Command>), PipelineError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(path) = self.train {
            config.train_path = path;
        }
        if let Some(path) = self.test {
            config.test_path = path;
        }
        if let Some(path) = self.output {
            config.submission_path = path;
        }
        if self.limit.is_some() {
            config.prediction_limit = self.limit;
        }
        if self.save_model.is_some() {
            config.model_path = self.save_model;
        }
        match self.trainer {
            Some(TrainerKind::Gbdt) if !matches!(config.trainer, TrainerConfig::Gbdt(_)) => {
                config.trainer = TrainerConfig::Gbdt(GradientBoostingTrainer::default());
            }
            Some(TrainerKind::Logistic)
                if !matches!(config.trainer, TrainerConfig::Logistic(_)) =>
            {
                config.trainer = TrainerConfig::Logistic(LogisticRegressionTrainer::default());
            }
            _ => {}
        }
        if let Some(seed) = self.seed {
            config.trainer = config.trainer.with_seed(seed);
        }
        Ok((config, self.command))
    }
}

/// One `<id>, <0|1>` console line.
fn console_line(row: &SubmissionRow) -> String {
    format!("{}, {}", row.passenger_id, u8::from(row.survived))
}

fn print_predictions(batch: &PredictionBatch) {
    println!("\nPassengerId, Survived");
    for row in &batch.rows {
        println!("{}", console_line(row));
    }
    if batch.skipped > 0 {
        println!("({} rows not scored: limit reached)", batch.skipped);
    }
}

fn execute(cli: Cli) -> Result<(), PipelineError> {
    let (config, command) = cli.into_config()?;
    config.validate()?;

    match command {
        Some(Command::Predict { model }) => {
            let model = SurvivalModel::load_from_file(model)?;
            let batch = runner::predict_file(&config, &model)?;
            print_predictions(&batch);
        }
        None => {
            let summary = runner::run(&config)?;
            println!(
                "=== In-sample metrics ({}) ===",
                summary.model.classifier().kind()
            );
            println!("{}", summary.metrics);
            print_predictions(&summary.predictions);
        }
    }
    println!(
        "\nSubmission written to {}",
        config.submission_path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
