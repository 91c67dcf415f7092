//! Bulk conversion and indexing.
//!
//! Records are converted one by one; unconvertible ones are skipped with a
//! warning. Converted documents go to the index in fixed-size batches, one
//! batch in flight. A failed document or batch is recorded and the load
//! continues; nothing already indexed is rolled back.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::DEFAULT_BULK_BATCH_SIZE;
use crate::error::GndResult;
use crate::normalize::Normalizer;
use crate::rdf::{RdfGraph, RdfSyntax};
use crate::traits::{IndexDocument, SearchIndex};

/// A document the index did not accept.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkFailure {
    pub id: String,
    pub error: String,
}

/// Statistics from a bulk load.
#[derive(Debug, Default, Clone)]
pub struct BulkStats {
    /// Records or documents seen.
    pub total: u64,
    /// Documents the index accepted.
    pub indexed: u64,
    /// Records that could not be converted or parsed.
    pub skipped: u64,
    /// Documents the index rejected.
    pub failures: Vec<BulkFailure>,
    /// Bulk requests sent.
    pub batches: u64,
}

impl BulkStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if every document was indexed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Add the counts of another load.
    pub fn merge(&mut self, other: BulkStats) {
        self.total += other.total;
        self.indexed += other.indexed;
        self.skipped += other.skipped;
        self.batches += other.batches;
        self.failures.extend(other.failures);
    }

    /// Get the failure rate as a percentage.
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.failures.len() as f64 / self.total as f64) * 100.0
        }
    }
}

/// Convert one serialized record into an index document.
pub fn convert_record(
    normalizer: &Normalizer,
    record: &str,
    syntax: RdfSyntax,
) -> Option<IndexDocument> {
    let graph = match RdfGraph::parse(record, syntax, None) {
        Ok(graph) => graph,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping unparseable record");
            return None;
        }
    };

    let Some(id) = normalizer.extract_id(&graph) else {
        tracing::warn!(triples = graph.len(), "Skipping record without identifier");
        return None;
    };

    let source = normalizer.normalize(&id, &graph, normalizer.config().context_variant)?;
    Some(IndexDocument { id, source })
}

/// Convert a sequence of records, counting those skipped.
pub fn convert_records<'a, I>(
    normalizer: &Normalizer,
    records: I,
    syntax: RdfSyntax,
) -> (Vec<IndexDocument>, u64)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut documents = Vec::new();
    let mut skipped = 0;
    for record in records {
        match convert_record(normalizer, record, syntax) {
            Some(document) => documents.push(document),
            None => skipped += 1,
        }
    }
    (documents, skipped)
}

/// Index documents in batches of `batch_size` (0 uses the default of 1000).
pub async fn bulk_load<I>(index: &dyn SearchIndex, documents: I, batch_size: usize) -> BulkStats
where
    I: IntoIterator<Item = IndexDocument>,
{
    let batch_size = effective_batch_size(batch_size);
    let mut stats = BulkStats::new();
    let mut batch = Vec::with_capacity(batch_size);

    for document in documents {
        stats.total += 1;
        batch.push(document);
        if batch.len() >= batch_size {
            send_batch(index, std::mem::take(&mut batch), &mut stats).await;
        }
    }
    if !batch.is_empty() {
        send_batch(index, batch, &mut stats).await;
    }

    tracing::info!(
        index = index.index_name(),
        total = stats.total,
        indexed = stats.indexed,
        failed = stats.failures.len(),
        batches = stats.batches,
        "Bulk load finished"
    );
    stats
}

/// Index normalized documents read as JSON Lines.
///
/// Each line holds one document whose `id` is an entity URI in `namespace`.
/// Blank lines are ignored; malformed lines are counted as skipped.
pub async fn bulk_load_jsonl<R>(
    reader: R,
    index: &dyn SearchIndex,
    batch_size: usize,
    namespace: &str,
) -> GndResult<BulkStats>
where
    R: AsyncBufRead + Unpin,
{
    let batch_size = effective_batch_size(batch_size);
    let mut stats = BulkStats::new();
    let mut batch = Vec::with_capacity(batch_size);
    let mut lines = reader.lines();
    let mut line_number = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.total += 1;

        let parsed = serde_json::from_str::<Value>(line).ok().and_then(|source| {
            let id = source
                .get("id")
                .and_then(Value::as_str)?
                .strip_prefix(namespace)?
                .to_string();
            (!id.is_empty()).then_some(IndexDocument { id, source })
        });
        match parsed {
            Some(document) => {
                batch.push(document);
                if batch.len() >= batch_size {
                    send_batch(index, std::mem::take(&mut batch), &mut stats).await;
                }
            }
            None => {
                tracing::warn!(line = line_number, "Skipping malformed document line");
                stats.skipped += 1;
            }
        }
    }

    if !batch.is_empty() {
        send_batch(index, batch, &mut stats).await;
    }
    Ok(stats)
}

/// Batch size to use for a configured size; 0 means the default.
pub fn effective_batch_size(batch_size: usize) -> usize {
    if batch_size == 0 {
        DEFAULT_BULK_BATCH_SIZE
    } else {
        batch_size
    }
}

async fn send_batch(index: &dyn SearchIndex, batch: Vec<IndexDocument>, stats: &mut BulkStats) {
    let ids: Vec<String> = batch.iter().map(|d| d.id.clone()).collect();
    stats.batches += 1;

    match index.bulk_index(batch).await {
        Ok(results) => {
            for result in results {
                match result.error {
                    None => stats.indexed += 1,
                    Some(error) => {
                        tracing::warn!(entity_id = %result.id, error = %error, "Document not indexed");
                        stats.failures.push(BulkFailure {
                            id: result.id,
                            error,
                        });
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!(documents = ids.len(), error = %e, "Bulk request failed");
            let error = e.to_string();
            stats
                .failures
                .extend(ids.into_iter().map(|id| BulkFailure {
                    id,
                    error: error.clone(),
                }));
        }
    }
}
