//! Unified entry point handing out components configured from one `Config`

use batchline_common::{Config, Result};

#[cfg(feature = "codec")]
use batchline_codec::{Codec, CodecConfig};

#[cfg(feature = "retry")]
use batchline_retry::{RetryExecutor, RetryPolicy};

#[cfg(feature = "secrets")]
use batchline_secrets::{SecretRetriever, SecretSource};

#[cfg(feature = "queue")]
use batchline_queue::{QueueClient, QueueTransport};

/// Builds codecs, executors and pipelines that share one configuration
///
/// Every pipeline handed out shares the same retry policy instance.
#[derive(Debug, Clone, Default)]
pub struct Batchline {
    config: Config,
    #[cfg(feature = "retry")]
    executor: RetryExecutor,
}

impl Batchline {
    /// Entry point with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry point tuned by `config`
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            #[cfg(feature = "retry")]
            executor: RetryExecutor::new(RetryPolicy::from_config(&config)),
            config,
        })
    }

    /// Entry point tuned by `BATCHLINE_*` environment variables
    ///
    /// # Errors
    /// Returns `Configuration` for unparsable or out of range values
    pub fn from_env() -> Result<Self> {
        Self::from_config(Config::from_env()?)
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Payload codec using the configured ceiling and compression level
    /// Example: `Batchline::new().codec().encode(&value, true)?`
    #[cfg(feature = "codec")]
    #[must_use]
    pub fn codec(&self) -> Codec {
        Codec::new(CodecConfig::from_config(&self.config))
    }

    /// Shared retry executor
    /// Example: `Batchline::new().retry().run("call", || transport.call()).await`
    #[cfg(feature = "retry")]
    #[must_use]
    pub fn retry(&self) -> RetryExecutor {
        self.executor.clone()
    }

    /// Secret retriever over `source`
    /// Example: `Batchline::new().secrets(source)?.fetch(&ids).await`
    ///
    /// # Errors
    /// Returns `Configuration` if the configuration fails validation
    #[cfg(feature = "secrets")]
    pub fn secrets<S: SecretSource>(&self, source: S) -> Result<SecretRetriever<S>> {
        Ok(SecretRetriever::from_config(source, &self.config)?.with_executor(self.retry()))
    }

    /// Queue client over `transport`
    /// Example: `Batchline::new().queue(transport)?.send(&value, false).await`
    ///
    /// # Errors
    /// Returns `Configuration` if the configuration fails validation
    #[cfg(feature = "queue")]
    pub fn queue<Q: QueueTransport>(&self, transport: Q) -> Result<QueueClient<Q>> {
        Ok(QueueClient::from_config(transport, &self.config)?.with_executor(self.retry()))
    }
}
