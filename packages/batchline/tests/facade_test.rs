//! Components handed out by the unified entry point

use batchline::{
    Batchline, BatchlineError, Config, ErrorKind, MemoryQueue, StaticSecretSource,
    MAX_PAYLOAD_BYTES,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

#[test]
fn invalid_configuration_is_refused() {
    let config = Config {
        retry_attempts: 0,
        ..Config::default()
    };
    let err = Batchline::from_config(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn codec_uses_the_configured_ceiling() {
    let batchline = Batchline::from_config(Config {
        max_payload_bytes: 16,
        ..Config::default()
    })
    .unwrap();

    let err = batchline.codec().encode(&"a longer string than sixteen", false).unwrap_err();

    assert_eq!(err, BatchlineError::too_large(30, 16));
    assert_eq!(Batchline::new().codec().config().max_payload_bytes, MAX_PAYLOAD_BYTES);
}

#[test]
fn pipelines_share_one_retry_policy() {
    let batchline = Batchline::new();
    let secrets = batchline.secrets(StaticSecretSource::new()).unwrap();
    let queue = batchline.queue(MemoryQueue::new()).unwrap();

    assert!(std::ptr::eq(
        batchline.retry().policy(),
        queue.executor().policy()
    ));
    drop(secrets);
}

#[tokio::test]
async fn secrets_flow_into_the_queue() {
    let batchline = Batchline::new();
    let source = StaticSecretSource::new()
        .with_secret("db", r#"{"host":"db.internal","port":"5432"}"#)
        .with_secret("cache", r#"{"host":"cache.internal"}"#);
    let queue = Arc::new(MemoryQueue::new());

    let merged = batchline
        .secrets(source)
        .unwrap()
        .fetch(&["db", "cache"])
        .await
        .unwrap();
    let client = batchline.queue(queue.clone()).unwrap();
    client.send(&merged, true).await.unwrap();

    let received = client
        .with_compressed_bodies(true)
        .receive::<HashMap<String, String>>(1)
        .await
        .unwrap();

    assert_eq!(received[0].value, merged);
    assert_eq!(received[0].value["host"], "cache.internal");
    assert_eq!(queue.in_flight().unwrap(), 1);
}

#[tokio::test]
async fn queue_client_sends_plain_json_by_default() {
    let client = Batchline::new().queue(MemoryQueue::new()).unwrap();

    client.send(&json!({"n": 1}), false).await.unwrap();
    let received = client.receive::<serde_json::Value>(10).await.unwrap();

    assert_eq!(received[0].value["n"], 1);
}
