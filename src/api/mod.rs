//! Typed client for the soteria REST API.
//!
//! Account and rule endpoints answer with a `{code, message, data}` envelope;
//! `/token`, `/auth` and `/acl` answer in plain text. Both shapes are decoded
//! here so callers only ever see typed records or [`ApiError`].

mod accounts;
mod rules;
mod token;

pub mod error;
pub mod types;

pub use error::ApiError;
pub use types::{AccessType, Account, AccountUpdate, Code, Credential, Rule, RuleSpec, UserType};

use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use types::Envelope;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SoteriaClient {
    base: Url,
    http: reqwest::Client,
}

impl SoteriaClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // Url::join drops the last path segment of a slash-less base, so
        // "https://host/v1" and "https://host/v1/" must both mean the latter.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized).map_err(|err| ApiError::Url {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(|err| ApiError::Url {
            url: path.to_string(),
            reason: err.to_string(),
        })
    }
}

/// Decode an enveloped response. A body that does not parse as an envelope
/// (proxy error pages, HTML) becomes `UnexpectedStatus` with the raw text.
async fn read_envelope<T: DeserializeOwned>(resp: Response) -> Result<Envelope<T>, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    debug!(status = %status, "soteria response");
    serde_json::from_str(&body).map_err(|_| ApiError::UnexpectedStatus { status, body })
}
