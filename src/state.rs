use anyhow::Context;
use std::sync::Arc;

use crate::catalog::load_catalog;
use crate::config::Config;
use crate::interpret::{QueryInterpreter, Vocabulary};
use crate::llm::extract::LlmExtractor;
use crate::search::catalog_index::CatalogIndex;

/// Shared application state. Everything behind it is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub interpreter: Arc<QueryInterpreter<LlmExtractor>>,
    pub catalog: Arc<CatalogIndex>,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Load the catalog, build the vocabulary and rebuild the search index.
    ///
    /// Fails if the catalog cannot be read: there is no degraded mode
    /// without a vocabulary.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let products = load_catalog(&config.catalog_path)
            .context("Catalog unavailable, cannot build vocabulary")?;

        let vocabulary = Arc::new(Vocabulary::load(
            &products,
            config.interpreter.attribute_top_n,
        ));

        let catalog = CatalogIndex::open_or_create(&config.index_dir())?;
        catalog.rebuild(&products)?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let extractor = LlmExtractor::new(http_client.clone(), config.llm.clone());
        let interpreter = QueryInterpreter::new(vocabulary, &config.interpreter, extractor);

        Ok(Self {
            config,
            interpreter: Arc::new(interpreter),
            catalog: Arc::new(catalog),
            http_client,
        })
    }
}
