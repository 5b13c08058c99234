//! Provider boundary for secret retrieval

use crate::types::{BatchGetResponse, SecretValue};
use batchline_common::{BatchError, BatchlineError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// A secret store reachable over some transport
///
/// Implementations classify their own failures: throttling and dropped
/// connections become `TransportTransient`, a refused single lookup becomes
/// `Rejected`, anything else `TransportTerminal`.
pub trait SecretSource: Send + Sync {
    /// Fetch one secret by identifier
    fn get_one(&self, id: &str) -> impl Future<Output = Result<SecretValue>> + Send;

    /// Fetch several secrets in one request
    ///
    /// Ids the provider refuses come back in `errors` rather than failing
    /// the call.
    fn get_many(&self, ids: &[String]) -> impl Future<Output = Result<BatchGetResponse>> + Send;
}

impl<S: SecretSource> SecretSource for Arc<S> {
    fn get_one(&self, id: &str) -> impl Future<Output = Result<SecretValue>> + Send {
        (**self).get_one(id)
    }

    fn get_many(&self, ids: &[String]) -> impl Future<Output = Result<BatchGetResponse>> + Send {
        (**self).get_many(ids)
    }
}

const NOT_FOUND: &str = "ResourceNotFoundException";

/// In-process secret store keyed by identifier
///
/// Unknown ids are rejected the way a remote provider reports missing
/// secrets.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretSource {
    secrets: HashMap<String, SecretValue>,
}

impl StaticSecretSource {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text secret stored under `id`
    #[must_use]
    pub fn with_secret(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        let id = id.into();
        self.secrets
            .insert(id.clone(), SecretValue::string(id, value));
        self
    }

    /// Add a prepared secret value stored under `id`
    #[must_use]
    pub fn with_value(mut self, id: impl Into<String>, value: SecretValue) -> Self {
        self.secrets.insert(id.into(), value);
        self
    }

    fn lookup(&self, id: &str) -> std::result::Result<SecretValue, BatchError> {
        self.secrets.get(id).cloned().ok_or_else(|| {
            BatchError::new(id, NOT_FOUND, "Secrets Manager can't find the specified secret.")
        })
    }
}

impl SecretSource for StaticSecretSource {
    fn get_one(&self, id: &str) -> impl Future<Output = Result<SecretValue>> + Send {
        let found = self.lookup(id).map_err(BatchlineError::from);
        async move { found }
    }

    fn get_many(&self, ids: &[String]) -> impl Future<Output = Result<BatchGetResponse>> + Send {
        let mut response = BatchGetResponse::default();
        for id in ids {
            match self.lookup(id) {
                Ok(value) => response.values.push(value),
                Err(rejection) => response.errors.push(rejection),
            }
        }
        async move { Ok(response) }
    }
}
