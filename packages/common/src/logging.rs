//! Structured logging infrastructure
//!
//! Library code emits `tracing` events; with no `tracing` subscriber
//! installed they are forwarded as `log` records, which `env_logger` prints.
//! Secret values never pass through these helpers, only identifiers and counts.

use log::{debug, info, warn};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging setup and shared log lines for pipeline events
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging (call once at application startup)
    ///
    /// Configure levels through `RUST_LOG`:
    /// - `RUST_LOG=info` - batch summaries and exhausted retries
    /// - `RUST_LOG=debug` - every retry and dispatched batch
    /// - `RUST_LOG=batchline_retry=debug,batchline_queue=info` - per crate
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            if env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .try_init()
                .is_ok()
            {
                info!("Structured logging initialized");
            }
        });
    }

    /// Initialize logging for test environments
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Log the shape of a partitioned operation
    pub fn log_batch_plan(operation: &str, items: usize, batches: usize) {
        debug!("{operation}: {items} item(s) in {batches} batch(es)");
    }

    /// Log the outcome of an aggregated operation
    pub fn log_batch_outcome(operation: &str, succeeded: usize, failed: usize) {
        if failed == 0 {
            info!("{operation} succeeded: {succeeded} item(s)");
        } else {
            warn!("{operation} failed: {failed} item(s) rejected, {succeeded} succeeded");
        }
    }
}
