//! Aggregation precedence and failure surfacing

use batchline_batch::{aggregate, Aggregator, ChunkOutcome};
use batchline_common::BatchError;
use std::collections::HashMap;

fn bundle(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn later_bundle_wins_on_key_collision() {
    let merged: HashMap<String, String> = aggregate(vec![
        ChunkOutcome::success(vec![bundle(&[("a", "1"), ("b", "kept")])]),
        ChunkOutcome::success(vec![bundle(&[("a", "2")])]),
    ])
    .unwrap();

    assert_eq!(merged["a"], "2");
    assert_eq!(merged["b"], "kept");
}

#[test]
fn one_failed_chunk_fails_the_whole_operation() {
    let result: Result<HashMap<String, String>, _> = aggregate(vec![
        ChunkOutcome::new(
            vec![bundle(&[("host", "localhost")])],
            vec![BatchError::new("z", "ResourceNotFoundException", "missing")],
        ),
        ChunkOutcome::success(vec![bundle(&[("region", "eu")])]),
    ]);

    let err = result.unwrap_err();
    assert_eq!(
        err.errors(),
        &[BatchError::new("z", "ResourceNotFoundException", "missing")]
    );
}

#[test]
fn errors_from_every_chunk_are_kept_in_order() {
    let mut aggregator = Aggregator::<Vec<u32>>::new();
    aggregator.push(ChunkOutcome::failure(vec![BatchError::new("1", "E1", "first")]));
    aggregator.push(ChunkOutcome::success(vec![7, 8]));
    aggregator.push(ChunkOutcome::new(
        vec![9],
        vec![
            BatchError::new("2", "E2", "second"),
            BatchError::new("3", "E3", "third"),
        ],
    ));

    assert_eq!(aggregator.chunks(), 3);
    assert_eq!(aggregator.values(), 3);
    let err = aggregator.finish().unwrap_err();
    assert_eq!(err.ids().collect::<Vec<_>>(), vec!["1", "2", "3"]);
}

#[test]
fn clean_chunks_merge_regardless_of_count() {
    let outcomes = (0..10).map(|i| ChunkOutcome::success(vec![i, i + 100]));
    let merged: Vec<i32> = aggregate(outcomes).unwrap();
    assert_eq!(merged.len(), 20);
}

#[test]
fn no_chunks_is_an_empty_success() {
    let merged: HashMap<String, String> =
        aggregate(Vec::<ChunkOutcome<HashMap<String, String>>>::new()).unwrap();
    assert!(merged.is_empty());
}

#[test]
fn result_conversion_maps_both_arms() {
    let ok: ChunkOutcome<u8> = Ok(vec![1]).into();
    assert!(ok.is_clean());
    let failed: ChunkOutcome<u8> = Err(vec![BatchError::new("x", "E", "m")]).into();
    assert!(!failed.is_clean());
    assert!(failed.values.is_empty());
}
