//! Error types for the survey core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown step: {0}")]
    UnknownStep(u8),

    #[error("Step {step} is not part of the {variant} survey")]
    StepNotInVariant { step: u8, variant: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
