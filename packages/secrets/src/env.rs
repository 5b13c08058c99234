//! Environment variable helpers for secret ids and merged secrets

use crate::types::MergedSecrets;
use batchline_common::{BatchlineError, Result};
use tracing::debug;

/// Variable read by `secret_ids_from_env` when no name is given
pub const DEFAULT_SECRET_IDS_VAR: &str = "BATCHLINE_SECRET_IDS";

/// Split a comma separated id list, trimming whitespace and dropping blanks
#[must_use]
pub fn parse_secret_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Read secret ids from `var`, or `BATCHLINE_SECRET_IDS` when `None`
///
/// # Errors
/// Returns `Configuration` if the variable is unset or not unicode
pub fn secret_ids_from_env(var: Option<&str>) -> Result<Vec<String>> {
    let var = var.unwrap_or(DEFAULT_SECRET_IDS_VAR);
    let raw = std::env::var(var).map_err(|e| {
        BatchlineError::configuration(format!("secret id variable {var}: {e}"))
    })?;
    Ok(parse_secret_ids(&raw))
}

/// Export merged secrets as process environment variables
///
/// Existing variables are kept unless `overwrite` is set. All keys are
/// checked before anything is written. Returns the number of variables set.
///
/// # Errors
/// Returns `Configuration` if a key is empty or contains `=` or NUL, or a
/// value contains NUL
pub fn load_into_env(secrets: &MergedSecrets, overwrite: bool) -> Result<usize> {
    for (key, value) in secrets {
        if key.is_empty() || key.contains(|c: char| c == '=' || c == '\0') || value.contains('\0') {
            return Err(BatchlineError::configuration(format!(
                "secret key {key:?} cannot be exported as an environment variable"
            )));
        }
    }

    let mut written = 0;
    for (key, value) in secrets {
        if !overwrite && std::env::var_os(key).is_some() {
            debug!(key = key.as_str(), "keeping existing environment variable");
            continue;
        }
        std::env::set_var(key, value);
        written += 1;
    }
    Ok(written)
}
