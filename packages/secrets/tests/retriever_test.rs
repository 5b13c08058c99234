//! Secret retrieval against a recording source

use batchline_common::{BatchError, BatchlineError, Config, ErrorKind};
use batchline_retry::{Backoff, RetryPolicy};
use batchline_secrets::{
    BatchGetResponse, SecretRetriever, SecretSource, SecretValue, StaticSecretSource,
};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves secrets from memory and records every request
#[derive(Default)]
struct RecordingSource {
    secrets: HashMap<String, SecretValue>,
    rejected: HashSet<String>,
    transient_failures: AtomicU32,
    single_calls: Mutex<Vec<String>>,
    batch_calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingSource {
    fn with_secret(mut self, id: &str, json: &str) -> Self {
        self.secrets
            .insert(id.to_string(), SecretValue::string(format!("arn:{id}"), json));
        self
    }

    fn with_value(mut self, id: &str, value: SecretValue) -> Self {
        self.secrets.insert(id.to_string(), value);
        self
    }

    fn rejecting(mut self, id: &str) -> Self {
        self.rejected.insert(id.to_string());
        self
    }

    fn failing_transiently(self, times: u32) -> Self {
        self.transient_failures.store(times, Ordering::SeqCst);
        self
    }

    fn take_transient(&self) -> bool {
        self.transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn rejection(id: &str) -> BatchError {
        BatchError::new(id, "ResourceNotFoundException", "not found")
    }

    fn single_calls(&self) -> Vec<String> {
        self.single_calls.lock().unwrap().clone()
    }

    fn batch_calls(&self) -> Vec<Vec<String>> {
        self.batch_calls.lock().unwrap().clone()
    }
}

impl SecretSource for RecordingSource {
    fn get_one(&self, id: &str) -> impl Future<Output = batchline_common::Result<SecretValue>> + Send {
        self.single_calls.lock().unwrap().push(id.to_string());
        let result = if self.take_transient() {
            Err(BatchlineError::transient("throttled"))
        } else if self.rejected.contains(id) {
            Err(BatchlineError::from(Self::rejection(id)))
        } else {
            self.secrets
                .get(id)
                .cloned()
                .ok_or_else(|| BatchlineError::from(Self::rejection(id)))
        };
        async move { result }
    }

    fn get_many(
        &self,
        ids: &[String],
    ) -> impl Future<Output = batchline_common::Result<BatchGetResponse>> + Send {
        self.batch_calls.lock().unwrap().push(ids.to_vec());
        let result = if self.take_transient() {
            Err(BatchlineError::transient("throttled"))
        } else {
            let mut response = BatchGetResponse::default();
            for id in ids {
                match self.secrets.get(id) {
                    Some(value) if !self.rejected.contains(id) => {
                        response.values.push(value.clone());
                    }
                    _ => response.errors.push(Self::rejection(id)),
                }
            }
            Ok(response)
        };
        async move { result }
    }
}

fn numbered_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("id-{i:02}")).collect()
}

fn source_with(ids: &[String]) -> RecordingSource {
    ids.iter().fold(RecordingSource::default(), |source, id| {
        source.with_secret(id, &format!(r#"{{"{id}":"value-{id}"}}"#))
    })
}

#[tokio::test]
async fn empty_id_list_makes_no_requests() {
    let source = Arc::new(RecordingSource::default());
    let retriever = SecretRetriever::new(source.clone());

    let merged = retriever.fetch::<String>(&[]).await.unwrap();

    assert!(merged.is_empty());
    assert!(source.single_calls().is_empty());
    assert!(source.batch_calls().is_empty());
}

#[tokio::test]
async fn single_id_uses_exactly_one_single_lookup() {
    let source = Arc::new(RecordingSource::default().with_secret("db", r#"{"host":"localhost"}"#));
    let retriever = SecretRetriever::new(source.clone());

    let merged = retriever.fetch(&["db"]).await.unwrap();

    assert_eq!(merged["host"], "localhost");
    assert_eq!(source.single_calls(), vec!["db"]);
    assert!(source.batch_calls().is_empty());
}

#[tokio::test]
async fn later_secret_wins_on_key_collision() {
    let source = RecordingSource::default()
        .with_secret("first", r#"{"a":"1","only_first":"x"}"#)
        .with_secret("second", r#"{"a":"2"}"#);
    let retriever = SecretRetriever::new(source);

    let merged = retriever.fetch(&["first", "second"]).await.unwrap();

    assert_eq!(merged["a"], "2");
    assert_eq!(merged["only_first"], "x");
}

#[tokio::test]
async fn twenty_five_ids_go_out_as_twenty_then_five() {
    let ids = numbered_ids(25);
    let source = Arc::new(source_with(&ids));
    let retriever = SecretRetriever::new(source.clone());

    let merged = retriever.fetch(&ids).await.unwrap();

    assert_eq!(merged.len(), 25);
    let calls = source.batch_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], ids[..20]);
    assert_eq!(calls[1], ids[20..]);
}

#[tokio::test]
async fn one_rejected_id_fails_the_whole_fetch_with_only_that_id() {
    let mut ids = numbered_ids(25);
    ids[3] = "z".to_string();
    let source = Arc::new(source_with(&ids).rejecting("z"));
    let retriever = SecretRetriever::new(source.clone());

    let err = retriever.fetch(&ids).await.unwrap_err();

    let BatchlineError::Aggregate(aggregate) = err else {
        panic!("expected aggregate error");
    };
    assert_eq!(aggregate.ids().collect::<Vec<_>>(), vec!["z"]);
    assert_eq!(source.batch_calls().len(), 2);
}

#[tokio::test]
async fn rejections_from_every_batch_are_reported_in_order() {
    let ids = numbered_ids(45);
    let source = source_with(&ids).rejecting("id-30").rejecting("id-02").rejecting("id-41");
    let retriever = SecretRetriever::new(source);

    let err = retriever.fetch(&ids).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Aggregate);
    let BatchlineError::Aggregate(aggregate) = err else {
        unreachable!()
    };
    assert_eq!(
        aggregate.ids().collect::<Vec<_>>(),
        vec!["id-02", "id-30", "id-41"]
    );
}

#[tokio::test]
async fn rejected_single_id_is_reported_as_an_aggregate() {
    let source = RecordingSource::default().rejecting("gone");
    let retriever = SecretRetriever::new(source);

    let err = retriever.fetch(&["gone"]).await.unwrap_err();

    assert_eq!(
        err,
        BatchlineError::aggregate(vec![RecordingSource::rejection("gone")])
    );
}

#[tokio::test]
async fn invalid_secret_stops_before_the_next_batch() {
    let ids = numbered_ids(25);
    let source = Arc::new(source_with(&ids).with_secret("id-05", "not json"));
    let retriever = SecretRetriever::new(source.clone());

    let err = retriever.fetch(&ids).await.unwrap_err();

    assert_eq!(err, BatchlineError::invalid_secret("arn:id-05"));
    assert_eq!(source.batch_calls().len(), 1);
}

#[tokio::test]
async fn invalid_value_wins_over_rejections_in_the_same_batch() {
    let source = RecordingSource::default()
        .with_secret("bad", r#"{"port":5432}"#)
        .rejecting("missing");
    let retriever = SecretRetriever::new(source);

    let err = retriever.fetch(&["missing", "bad"]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidSecretValue);
}

#[tokio::test]
async fn binary_secrets_are_decoded_from_base64() {
    // {"user":"admin"}
    let source = RecordingSource::default().with_value(
        "bin",
        SecretValue::binary("arn:bin", "eyJ1c2VyIjoiYWRtaW4ifQ=="),
    );
    let retriever = SecretRetriever::new(source);

    let merged = retriever.fetch(&["bin"]).await.unwrap();

    assert_eq!(merged["user"], "admin");
}

#[tokio::test(start_paused = true)]
async fn throttled_batches_are_retried() {
    let ids = numbered_ids(3);
    let source = Arc::new(source_with(&ids).failing_transiently(2));
    let retriever = SecretRetriever::new(source.clone());

    let merged = retriever.fetch(&ids).await.unwrap();

    assert_eq!(merged.len(), 3);
    assert_eq!(source.batch_calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_surface_the_transport_error() {
    let source = Arc::new(RecordingSource::default().failing_transiently(u32::MAX));
    let retriever = SecretRetriever::new(source.clone()).with_retry_policy(RetryPolicy::new(
        4,
        Backoff::fixed(Duration::from_millis(5)),
    ));

    let err = retriever.fetch(&["a"]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportTransient);
    assert_eq!(source.single_calls().len(), 4);
}

#[tokio::test]
async fn concurrent_batches_merge_every_secret() {
    let ids = numbered_ids(95);
    let source = Arc::new(source_with(&ids));
    let retriever = SecretRetriever::new(source.clone()).with_concurrency(3);

    let merged = retriever.fetch(&ids).await.unwrap();

    assert_eq!(merged.len(), 95);
    assert_eq!(merged["id-94"], "value-id-94");
    assert_eq!(source.batch_calls().len(), 5);
}

#[tokio::test]
async fn configured_batch_size_is_honoured() {
    let ids = numbered_ids(12);
    let source = Arc::new(source_with(&ids));
    let config = Config {
        batch_size_limit: 5,
        ..Config::default()
    };
    let retriever = SecretRetriever::from_config(source.clone(), &config).unwrap();

    retriever.fetch(&ids).await.unwrap();

    let sizes: Vec<usize> = source.batch_calls().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![5, 5, 2]);
}

#[tokio::test]
async fn static_source_rejects_unknown_ids() {
    let source = StaticSecretSource::new().with_secret("known", r#"{"k":"v"}"#);
    let retriever = SecretRetriever::new(source);

    let err = retriever.fetch(&["known", "unknown"]).await.unwrap_err();

    let BatchlineError::Aggregate(aggregate) = err else {
        panic!("expected aggregate error");
    };
    assert_eq!(aggregate.errors()[0].id, "unknown");
    assert_eq!(aggregate.errors()[0].code, "ResourceNotFoundException");
}
