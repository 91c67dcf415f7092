//! Wiring of the shared read-only resources and the services built on them.

use std::sync::Arc;

use crate::config::GndConfig;
use crate::error::GndResult;
use crate::extension::ExtensionResolver;
use crate::manifest::ServiceManifest;
use crate::normalize::{Context, Normalizer};
use crate::ontology::OntologyStore;
use crate::reconcile::Reconciler;
use crate::suggest::SuggestService;
use crate::traits::SearchIndex;

/// Everything a reconciliation service needs, built once at startup.
///
/// The ontology and context are loaded from the configured paths or the
/// bundled defaults; a load failure is returned and nothing is built.
#[derive(Clone)]
pub struct Engine {
    config: Arc<GndConfig>,
    ontology: Arc<OntologyStore>,
    context: Arc<Context>,
    index: Arc<dyn SearchIndex>,
    normalizer: Normalizer,
    reconciler: Reconciler,
    extension: ExtensionResolver,
    suggest: SuggestService,
}

impl Engine {
    /// Load ontology and context, then build the services.
    pub fn new(config: GndConfig, index: Arc<dyn SearchIndex>) -> GndResult<Self> {
        let ontology = match &config.ontology_path {
            Some(path) => OntologyStore::from_file(path)?,
            None => OntologyStore::bundled()?,
        };
        let context = match &config.context_path {
            Some(path) => Context::from_file(path)?,
            None => Context::bundled()?,
        };
        tracing::info!(
            terms = ontology.len(),
            index = index.index_name(),
            "Loaded ontology and context"
        );
        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(ontology),
            Arc::new(context),
            index,
        ))
    }

    /// Build the services from already loaded resources.
    pub fn from_parts(
        config: Arc<GndConfig>,
        ontology: Arc<OntologyStore>,
        context: Arc<Context>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        let normalizer = Normalizer::new(
            Arc::clone(&config),
            Arc::clone(&context),
            Arc::clone(&ontology),
        );
        let reconciler = Reconciler::new(
            Arc::clone(&index),
            Arc::clone(&ontology),
            Arc::clone(&config),
        );
        let extension = ExtensionResolver::new(
            Arc::clone(&index),
            Arc::clone(&ontology),
            Arc::clone(&config),
        );
        let suggest = SuggestService::new(
            Arc::clone(&index),
            Arc::clone(&ontology),
            Arc::clone(&config),
        );

        Self {
            config,
            ontology,
            context,
            index,
            normalizer,
            reconciler,
            extension,
            suggest,
        }
    }

    pub fn config(&self) -> &GndConfig {
        &self.config
    }

    pub fn ontology(&self) -> &OntologyStore {
        &self.ontology
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.index
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn extension(&self) -> &ExtensionResolver {
        &self.extension
    }

    pub fn suggest(&self) -> &SuggestService {
        &self.suggest
    }

    pub fn manifest(&self) -> ServiceManifest {
        ServiceManifest::new(&self.config, &self.ontology)
    }
}
