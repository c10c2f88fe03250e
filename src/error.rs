// Error taxonomy shown to the user. Anything in here ends the invocation
// with exit status 1; I/O and transport failures travel next to these as
// plain `anyhow` errors with context attached.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors caused by the invocation itself or reported back by the API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    /// The API key is not 40 lowercase hex digits.
    #[error("Invalid API key specified.")]
    InvalidApiKey,
    /// Neither a description nor a URL was given.
    #[error("Required argument `description' missing.")]
    MissingDescription,
    /// The priority is outside of -2..=2.
    #[error("Invalid value for --priority: {0}")]
    InvalidPriority(i64),
    /// `--set-api-key` was combined with other arguments.
    #[error("Cannot use --set-api-key with any other arguments or options.")]
    SetApiKeyConflict,
    /// No `--api-key` given and no default stored.
    #[error("--api-key is mandatory because no default API key has been set.")]
    MissingApiKey,
    /// The API answered with a non-success status.
    #[error("Error received from server: {status} - {body}")]
    Server { status: StatusCode, body: String },
}
