//! Loading record files into the search index.

use std::path::{Path, PathBuf};

use gnd_core::bulk::{bulk_load, bulk_load_jsonl, convert_record, effective_batch_size, BulkStats};
use gnd_core::{Engine, GndResult, IndexDocument, RdfSyntax};
use tokio::io::BufReader;
use tracing::{info, warn};

/// Create the index if needed and load every file into it.
///
/// `.jsonl` files hold normalized documents and are streamed line by line.
/// `.ttl`, `.nt` and `.rdf` files hold one record each; they are converted
/// as they are read and sent whenever a full batch is pending, so at most
/// one batch of converted documents is held at a time.
pub async fn load_files(engine: &Engine, paths: &[PathBuf]) -> GndResult<BulkStats> {
    let index = engine.index().as_ref();
    index.create_index().await?;

    let batch_size = effective_batch_size(engine.config().bulk_batch_size);
    let namespace = engine.config().namespace.as_str();
    let mut pending: Vec<IndexDocument> = Vec::with_capacity(batch_size);
    let mut totals = BulkStats::new();

    for path in paths {
        match extension(path).as_deref() {
            Some("jsonl") => {
                let file = tokio::fs::File::open(path).await?;
                let stats =
                    bulk_load_jsonl(BufReader::new(file), index, batch_size, namespace).await?;
                info!(path = %path.display(), indexed = stats.indexed, "Loaded documents");
                totals.merge(stats);
            }
            Some(ext) => match RdfSyntax::from_extension(ext) {
                Some(syntax) => {
                    let record = tokio::fs::read_to_string(path).await?;
                    match convert_record(engine.normalizer(), &record, syntax) {
                        Some(document) => pending.push(document),
                        None => totals.skipped += 1,
                    }
                    if pending.len() >= batch_size {
                        let batch = std::mem::take(&mut pending);
                        totals.merge(bulk_load(index, batch, batch_size).await);
                    }
                }
                None => {
                    warn!(path = %path.display(), "Skipping file with unknown extension");
                    totals.skipped += 1;
                }
            },
            None => {
                warn!(path = %path.display(), "Skipping file without extension");
                totals.skipped += 1;
            }
        }
    }

    if !pending.is_empty() {
        totals.merge(bulk_load(index, pending, batch_size).await);
    }
    Ok(totals)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
