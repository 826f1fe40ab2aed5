//! Duration strings in the service's dialect.
//!
//! The service counts token lifetimes in nanoseconds but operators think in
//! `"30s"`, `"15m"`, `"1h30m"`. This module converts both ways. Accepted
//! units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`; segments may repeat and
//! carry decimals (`"1.5h"`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseDurationError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration {0:?}")]
    Invalid(String),
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("unknown unit in duration {0:?}")]
    UnknownUnit(String),
    #[error("duration {0:?} out of range")]
    OutOfRange(String),
}

// Two-character units listed first so "ms" is not read as minutes.
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
];

/// Parse a duration string into nanoseconds.
pub fn parse(input: &str) -> Result<i64, ParseDurationError> {
    let src = input.trim();
    if src.is_empty() {
        return Err(ParseDurationError::Empty);
    }
    if src == "0" {
        return Ok(0);
    }

    let mut total = 0.0f64;
    let mut rest = src;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if digits == 0 {
            return Err(ParseDurationError::Invalid(input.to_string()));
        }
        let value: f64 = rest[..digits]
            .parse()
            .map_err(|_| ParseDurationError::Invalid(input.to_string()))?;

        let after = &rest[digits..];
        if after.is_empty() {
            return Err(ParseDurationError::MissingUnit(input.to_string()));
        }
        let (len, scale) = UNITS
            .iter()
            .find(|(unit, _)| after.starts_with(unit))
            .map(|(unit, scale)| (unit.len(), *scale))
            .ok_or_else(|| ParseDurationError::UnknownUnit(input.to_string()))?;

        total += value * scale;
        rest = &after[len..];
    }

    if !total.is_finite() || total > i64::MAX as f64 {
        return Err(ParseDurationError::OutOfRange(input.to_string()));
    }
    Ok(total as i64)
}

/// Render nanoseconds back into the compact `1h30m` form.
pub fn format(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 0 {
        return format!("-{}", format(nanos.checked_neg().unwrap_or(i64::MAX)));
    }
    if nanos < 1_000_000_000 {
        if nanos % 1_000_000 == 0 {
            return format!("{}ms", nanos / 1_000_000);
        }
        if nanos % 1_000 == 0 {
            return format!("{}us", nanos / 1_000);
        }
        return format!("{nanos}ns");
    }

    let total_secs = nanos / 1_000_000_000;
    let frac_nanos = nanos % 1_000_000_000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if frac_nanos > 0 {
        out.push_str(&format!(
            "{}s",
            secs as f64 + frac_nanos as f64 / 1_000_000_000.0
        ));
    } else if secs > 0 {
        out.push_str(&format!("{secs}s"));
    }
    out
}
