//! Integration tests for bulk conversion and indexing.

mod common;

use std::io::Cursor;
use std::sync::Arc;

use common::{engine, FakeIndex, ANONYMOUS_TTL, BERLIN_TTL, GOETHE_TTL};
use gnd_core::bulk::convert_records;
use gnd_core::{bulk_load, bulk_load_jsonl, IndexDocument, RdfSyntax};
use serde_json::json;
use tokio::io::BufReader;

fn documents(count: usize) -> Vec<IndexDocument> {
    (1..=count)
        .map(|i| IndexDocument {
            id: i.to_string(),
            source: json!({"id": format!("https://d-nb.info/gnd/{}", i)}),
        })
        .collect()
}

#[tokio::test]
async fn test_documents_are_sent_in_batches() {
    let index = Arc::new(FakeIndex::new());

    let stats = bulk_load(index.as_ref(), documents(5), 2).await;

    assert_eq!(stats.total, 5);
    assert_eq!(stats.indexed, 5);
    assert_eq!(stats.batches, 3);
    assert!(stats.is_success());
    assert_eq!(*index.batch_sizes.lock().unwrap(), vec![2, 2, 1]);
    assert_eq!(index.stored_ids().len(), 5);
}

#[tokio::test]
async fn test_zero_batch_size_uses_default() {
    let index = Arc::new(FakeIndex::new());

    let stats = bulk_load(index.as_ref(), documents(3), 0).await;

    assert_eq!(stats.batches, 1);
    assert_eq!(*index.batch_sizes.lock().unwrap(), vec![3]);
}

#[tokio::test]
async fn test_rejected_document_is_recorded() {
    let index = Arc::new(FakeIndex::new().rejecting("2"));

    let stats = bulk_load(index.as_ref(), documents(3), 10).await;

    assert_eq!(stats.indexed, 2);
    assert_eq!(stats.failures.len(), 1);
    assert_eq!(stats.failures[0].id, "2");
    assert_eq!(stats.failures[0].error, "mapper_parsing_exception");
    assert!(!stats.is_success());
    assert_eq!(index.stored_ids(), vec!["1".to_string(), "3".to_string()]);
}

#[tokio::test]
async fn test_failed_batch_does_not_stop_the_load() {
    let index = Arc::new(FakeIndex::new().failing_batch(0));

    let stats = bulk_load(index.as_ref(), documents(4), 2).await;

    assert_eq!(stats.batches, 2);
    assert_eq!(stats.indexed, 2);
    let failed: Vec<&str> = stats.failures.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(failed, vec!["1", "2"]);
    assert_eq!(stats.error_rate(), 50.0);
    assert_eq!(index.stored_ids(), vec!["3".to_string(), "4".to_string()]);
}

#[tokio::test]
async fn test_convert_and_load_records() {
    let index = Arc::new(FakeIndex::new());
    let engine = engine(Arc::clone(&index));

    let (documents, skipped) = convert_records(
        engine.normalizer(),
        [GOETHE_TTL, ANONYMOUS_TTL, BERLIN_TTL],
        RdfSyntax::Turtle,
    );
    assert_eq!(skipped, 1);
    assert_eq!(documents.len(), 2);

    let stats = bulk_load(engine.index().as_ref(), documents, 1000).await;
    assert_eq!(stats.indexed, 2);

    let stored = index.documents.lock().unwrap();
    assert_eq!(stored["4005728-8"]["preferredName"], "Berlin");
    assert_eq!(
        stored["118540238"]["@context"],
        "https://lobid.org/gnd/context.jsonld"
    );
}

#[tokio::test]
async fn test_load_jsonl() {
    let index = Arc::new(FakeIndex::new());
    let input = concat!(
        r#"{"id":"https://d-nb.info/gnd/1","preferredName":"One"}"#,
        "\n",
        "\n",
        "not json\n",
        r#"{"id":"http://example.org/2"}"#,
        "\n",
        r#"{"id":"https://d-nb.info/gnd/3","preferredName":"Three"}"#,
        "\n",
    );
    let reader = BufReader::new(Cursor::new(input.as_bytes().to_vec()));

    let stats = bulk_load_jsonl(reader, index.as_ref(), 10, "https://d-nb.info/gnd/")
        .await
        .unwrap();

    assert_eq!(stats.total, 4);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.indexed, 2);
    assert_eq!(index.stored_ids(), vec!["1".to_string(), "3".to_string()]);
}
