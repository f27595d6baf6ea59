//! Error types for the CLI runtime.

use std::sync::Arc;

use tagwright_syntax::{ProcessError, TagError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid default tag request '{request}' from configuration: {source}")]
    DefaultRequest { request: String, source: TagError },
    #[error("{0}")]
    Request(TagError),
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("failed to read a match of '{pattern}': {source}")]
    UnreadableMatch {
        pattern: String,
        source: glob::GlobError,
    },
    #[error("no files match '{pattern}'")]
    NoMatches { pattern: String },
    #[error(transparent)]
    Process(#[from] ProcessError),
}
