//! Batched secret retrieval
//!
//! `SecretRetriever` turns a list of secret ids into one merged map of
//! key/value pairs. Each secret must hold a flat JSON object of strings.
//! Lookups go through a `SecretSource`, batched, retried, and aggregated so
//! that a single rejected id fails the whole call with every rejection
//! attached.
//!
//! ```no_run
//! use batchline_secrets::{SecretRetriever, StaticSecretSource};
//!
//! # async fn demo() -> batchline_common::Result<()> {
//! let source = StaticSecretSource::new()
//!     .with_secret("db", r#"{"host":"localhost","port":"5432"}"#);
//! let secrets = SecretRetriever::new(source).fetch(&["db"]).await?;
//! assert_eq!(secrets["host"], "localhost");
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod parse;
pub mod retriever;
pub mod source;
pub mod types;

pub use env::{load_into_env, parse_secret_ids, secret_ids_from_env, DEFAULT_SECRET_IDS_VAR};
pub use parse::parse_secret_value;
pub use retriever::SecretRetriever;
pub use source::{SecretSource, StaticSecretSource};
pub use types::{BatchGetResponse, MergedSecrets, SecretBundle, SecretValue};
