use reqwest::StatusCode;
use thiserror::Error;

use super::types::Code;

/// Failures surfaced by [`SoteriaClient`](super::SoteriaClient).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success envelope code.
    #[error("{code}: {message}")]
    Service { code: Code, message: String },

    /// Credential or token was rejected by a plain-text endpoint.
    #[error("request is not authorized")]
    Unauthorized,

    /// The response was not the shape this endpoint produces.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// The envelope reported success but carried no payload.
    #[error("service reported success but returned no {0}")]
    MissingData(&'static str),

    #[error("invalid url {url:?}: {reason}")]
    Url { url: String, reason: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
