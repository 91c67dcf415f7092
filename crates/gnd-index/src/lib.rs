//! gnd-index - Search index backends for gnd.
//!
//! This crate provides the [`SearchIndex`](gnd_core::SearchIndex)
//! implementations used by the reconciliation service and the bulk loader.
//!
//! # Supported Backends
//!
//! - **Elasticsearch** - REST API, query-string search
//! - **OpenSearch** - served by the Elasticsearch client

mod elasticsearch;
mod factory;

pub use elasticsearch::{index_settings, parse_search_response, search_body, ElasticsearchIndex};
pub use factory::IndexFactory;
