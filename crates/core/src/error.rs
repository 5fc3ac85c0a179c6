use std::io;

use thiserror::Error;

/// Failure starting a process pipeline.
///
/// `Unsupported` is a configuration-level condition and is kept distinct
/// from a launch failure so callers can tell "pipeline feature missing"
/// from "pipeline failed to start".
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("host runtime does not support process pipelines")]
    Unsupported,

    #[error(transparent)]
    Spawn(#[from] io::Error),
}

/// An operation was invoked with an argument combination outside the
/// closed set of recognized shapes. Raised immediately; the input is
/// never guessed at or silently dropped.
#[derive(Debug, Error)]
#[error("unsupported input shape for '{operation}': {details}")]
pub struct ShapeError {
    pub operation: &'static str,
    pub details: String,
}

impl ShapeError {
    pub fn new(operation: &'static str, details: impl Into<String>) -> Self {
        Self {
            operation,
            details: details.into(),
        }
    }
}
