//! gnd-load - Convert authority records and load them into the search index.
//!
//! Usage: `gnd-load <file>...`
//!
//! `.jsonl` files hold normalized documents, one per line, and are indexed
//! as they are. `.ttl`, `.nt` and `.rdf` files hold one authority record
//! each and are converted first.

use std::path::PathBuf;

use gnd_core::{Engine, GndConfig};
use gnd_index::IndexFactory;
use gnd_server::loader::load_files;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        eprintln!("Usage: gnd-load <file>...");
        std::process::exit(2);
    }

    let config = match std::env::var("GND_CONFIG") {
        Ok(path) => GndConfig::from_file(&path)?,
        Err(_) => GndConfig::from_env(),
    };
    let index = IndexFactory::create(&config.index)?;
    let engine = Engine::new(config, index)?;

    let totals = load_files(&engine, &paths).await?;

    info!(
        total = totals.total,
        indexed = totals.indexed,
        skipped = totals.skipped,
        failed = totals.failures.len(),
        error_rate = totals.error_rate(),
        "Load finished"
    );
    for failure in &totals.failures {
        warn!(entity_id = %failure.id, error = %failure.error, "Not indexed");
    }

    if totals.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
