use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// Optional CLI profile, so operators don't repeat the base URL and timeout
/// on every call. JSON, pointed at with `--profile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub base: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Profile {
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading profile {path}"))?;
        let profile = serde_json::from_str(&raw).with_context(|| format!("parsing profile {path}"))?;
        Ok(profile)
    }
}
