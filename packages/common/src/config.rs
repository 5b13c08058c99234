//! Explicit configuration passed to each pipeline's constructor

use crate::error::{BatchlineError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Maximum number of ids in one bulk secret fetch
pub const BATCH_SIZE_LIMIT: usize = 20;

/// Maximum number of entries in one batched enqueue
pub const QUEUE_BATCH_LIMIT: usize = 10;

/// Maximum encoded message size accepted by the queue transport
pub const MAX_PAYLOAD_BYTES: usize = 262_144;

/// Default number of attempts per remote call
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 10;

/// Default delay before the first retry, in milliseconds
pub const DEFAULT_BACKOFF_INITIAL_MS: u64 = 10;

/// Default geometric factor applied per attempt (below 1.0 shrinks)
pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.5;

/// Default gzip level
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

const ENV_PREFIX: &str = "BATCHLINE_";

/// Tunables for both pipelines; ceilings are enforced by `validate`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Ids per bulk secret fetch (1..=20)
    #[serde(default = "default_batch_size_limit")]
    pub batch_size_limit: usize,
    /// Entries per batched enqueue (1..=10)
    #[serde(default = "default_queue_batch_limit")]
    pub queue_batch_limit: usize,
    /// Encoded payload ceiling in bytes (1..=262144)
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Attempts per remote call, including the first
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Delay before the first retry
    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,
    /// Per-attempt delay multiplier
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    /// Gzip level, 0-9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    /// Batches in flight per secret fetch
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_batch_size_limit() -> usize {
    BATCH_SIZE_LIMIT
}

fn default_queue_batch_limit() -> usize {
    QUEUE_BATCH_LIMIT
}

fn default_max_payload_bytes() -> usize {
    MAX_PAYLOAD_BYTES
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_backoff_initial_ms() -> u64 {
    DEFAULT_BACKOFF_INITIAL_MS
}

fn default_backoff_factor() -> f64 {
    DEFAULT_BACKOFF_FACTOR
}

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

fn default_concurrency() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size_limit: default_batch_size_limit(),
            queue_batch_limit: default_queue_batch_limit(),
            max_payload_bytes: default_max_payload_bytes(),
            retry_attempts: default_retry_attempts(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_factor: default_backoff_factor(),
            compression_level: default_compression_level(),
            concurrency: default_concurrency(),
        }
    }
}

impl Config {
    /// Check every field against the provider ceilings
    ///
    /// # Errors
    /// Returns `BatchlineError::Configuration` naming the first invalid field
    pub fn validate(&self) -> Result<()> {
        if self.batch_size_limit == 0 || self.batch_size_limit > BATCH_SIZE_LIMIT {
            return Err(BatchlineError::configuration(format!(
                "batch_size_limit must be between 1 and {BATCH_SIZE_LIMIT}, got {}",
                self.batch_size_limit
            )));
        }
        if self.queue_batch_limit == 0 || self.queue_batch_limit > QUEUE_BATCH_LIMIT {
            return Err(BatchlineError::configuration(format!(
                "queue_batch_limit must be between 1 and {QUEUE_BATCH_LIMIT}, got {}",
                self.queue_batch_limit
            )));
        }
        if self.max_payload_bytes == 0 || self.max_payload_bytes > MAX_PAYLOAD_BYTES {
            return Err(BatchlineError::configuration(format!(
                "max_payload_bytes must be between 1 and {MAX_PAYLOAD_BYTES}, got {}",
                self.max_payload_bytes
            )));
        }
        if self.retry_attempts == 0 {
            return Err(BatchlineError::configuration(
                "retry_attempts must be at least 1",
            ));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor <= 0.0 {
            return Err(BatchlineError::configuration(format!(
                "backoff_factor must be a positive number, got {}",
                self.backoff_factor
            )));
        }
        if self.compression_level > 9 {
            return Err(BatchlineError::configuration(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        if self.concurrency == 0 {
            return Err(BatchlineError::configuration(
                "concurrency must be at least 1",
            ));
        }
        Ok(())
    }

    /// Parse a JSON document, filling missing fields with defaults
    ///
    /// # Errors
    /// Returns `BatchlineError::Configuration` if the document is malformed or invalid
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BatchlineError::configuration(format!("invalid config document: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read `BATCHLINE_*` variables over the defaults
    ///
    /// Recognized variables: `BATCHLINE_BATCH_SIZE_LIMIT`,
    /// `BATCHLINE_QUEUE_BATCH_LIMIT`, `BATCHLINE_MAX_PAYLOAD_BYTES`,
    /// `BATCHLINE_RETRY_ATTEMPTS`, `BATCHLINE_BACKOFF_INITIAL_MS`,
    /// `BATCHLINE_BACKOFF_FACTOR`, `BATCHLINE_COMPRESSION_LEVEL` and
    /// `BATCHLINE_CONCURRENCY`.
    ///
    /// # Errors
    /// Returns `BatchlineError::Configuration` if a variable does not parse or
    /// the resulting configuration is invalid
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with a caller supplied variable lookup
    ///
    /// # Errors
    /// Returns `BatchlineError::Configuration` if a value does not parse or
    /// the resulting configuration is invalid
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        override_with(&lookup, "BATCH_SIZE_LIMIT", &mut config.batch_size_limit)?;
        override_with(&lookup, "QUEUE_BATCH_LIMIT", &mut config.queue_batch_limit)?;
        override_with(&lookup, "MAX_PAYLOAD_BYTES", &mut config.max_payload_bytes)?;
        override_with(&lookup, "RETRY_ATTEMPTS", &mut config.retry_attempts)?;
        override_with(&lookup, "BACKOFF_INITIAL_MS", &mut config.backoff_initial_ms)?;
        override_with(&lookup, "BACKOFF_FACTOR", &mut config.backoff_factor)?;
        override_with(&lookup, "COMPRESSION_LEVEL", &mut config.compression_level)?;
        override_with(&lookup, "CONCURRENCY", &mut config.concurrency)?;
        config.validate()?;
        Ok(config)
    }
}

fn override_with<F, T>(lookup: &F, name: &str, slot: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let key = format!("{ENV_PREFIX}{name}");
    if let Some(raw) = lookup(&key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| BatchlineError::configuration(format!("{key}={raw:?}: {e}")))?;
        debug!(variable = %key, "configuration override applied");
    }
    Ok(())
}
