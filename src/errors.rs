use std::fmt::{Debug, Formatter};

use reqwest::StatusCode;

use crate::domain::RecipientFieldError;
use crate::transmission_request::ApiError;

/// Writes an error followed by every cause in its `source` chain.
pub fn error_chain_fmt(e: &impl std::error::Error, f: &mut Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

#[derive(thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to read the settings file")]
    Load(#[from] config::ConfigError),
    #[error("missing Authorization line in {0}")]
    MissingAuthorization(String),
    #[error("BatchSize must be greater than zero")]
    ZeroBatchSize,
    #[error("GlobalSub is not a valid JSON object")]
    InvalidGlobalSub(#[source] serde_json::Error),
}

impl Debug for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(thiserror::Error)]
pub enum RecipientError {
    #[error("Error opening recipients file {path}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid .csv file header - must contain \"email\" field")]
    InvalidHeader,
    #[error("Unexpected .csv file field name found: {0}")]
    UnrecognizedField(String),
    #[error("Invalid recipient on line {line}")]
    InvalidInput {
        line: u64,
        #[source]
        source: RecipientFieldError,
    },
    #[error("Failed to read recipient list")]
    Csv(#[from] csv::Error),
    #[error("Failed to read recipient list")]
    Io(#[from] std::io::Error),
}

impl Debug for RecipientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(thiserror::Error)]
pub enum SubmissionError {
    #[error("error code {} : {}", .status, format_api_errors(.errors))]
    Api {
        status: StatusCode,
        errors: Vec<ApiError>,
    },
    #[error("Failed to reach the delivery service")]
    Transport(#[source] reqwest::Error),
    #[error("Unexpected response from the delivery service: {0}")]
    UnexpectedResponse(String),
}

impl Debug for SubmissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

fn format_api_errors(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fatal outcomes of a run. Anything that reaches the caller as this error
/// has already stopped further submissions.
#[derive(thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidStartTime(String),
    #[error(transparent)]
    Recipients(#[from] RecipientError),
    #[error("Submission of batch {batch} failed")]
    Submission {
        batch: usize,
        #[source]
        source: SubmissionError,
    },
}

impl Debug for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
