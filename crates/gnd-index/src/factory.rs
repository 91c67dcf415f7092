//! Factory for creating search index backends.

use std::sync::Arc;

use gnd_core::config::{IndexConfig, IndexProvider};
use gnd_core::error::GndResult;
use gnd_core::traits::SearchIndex;

use crate::elasticsearch::ElasticsearchIndex;

/// Factory for creating search index backends.
pub struct IndexFactory;

impl IndexFactory {
    /// Create a search index from the given configuration.
    pub fn create(config: &IndexConfig) -> GndResult<Arc<dyn SearchIndex>> {
        match config.provider {
            IndexProvider::Elasticsearch | IndexProvider::Opensearch => {
                let index = ElasticsearchIndex::new(config)?;
                tracing::info!(
                    provider = %config.provider,
                    url = %config.url,
                    index = %config.index_name,
                    "Created search index client"
                );
                Ok(Arc::new(index))
            }
        }
    }

    /// Create an Elasticsearch index at `url`.
    pub fn elasticsearch(url: &str, index_name: &str) -> GndResult<Arc<dyn SearchIndex>> {
        Self::create(&IndexConfig {
            provider: IndexProvider::Elasticsearch,
            url: url.to_string(),
            index_name: index_name.to_string(),
            ..Default::default()
        })
    }
}
