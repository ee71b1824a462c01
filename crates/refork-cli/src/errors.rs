//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use refork_pipeline::{PipelineError, RunFailure};
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("unknown recipe '{name}'; available recipes: {available}")]
    UnknownRecipe { name: String, available: String },
    #[error("failed to build recipe: {0}")]
    Recipe(PipelineError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("{0}")]
    Run(Box<RunFailure>),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl From<RunFailure> for AppError {
    fn from(failure: RunFailure) -> Self {
        Self::Run(Box::new(failure))
    }
}
