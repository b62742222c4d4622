use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::filters::FilterSet;
use super::rules::{self, Thresholds};
use super::vocabulary::Vocabulary;
use crate::config::InterpreterConfig;
use crate::llm::chat::LlmError;

/// Why the learned extraction path produced no usable filters.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("LLM extraction timed out after {0:?}")]
    Timeout(Duration),
    #[error("LLM reply is not a JSON object: {0}")]
    MalformedJson(String),
    #[error("LLM reply violates the filter schema: {0}")]
    Schema(String),
}

/// A learned (model-backed) filter extraction path.
pub trait FilterExtractor {
    fn extract(
        &self,
        query: &str,
        vocabulary: &Vocabulary,
    ) -> impl Future<Output = Result<FilterSet, ExtractError>> + Send;
}

/// Which path produced a filter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSource {
    Learned,
    Rules,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub filters: FilterSet,
    pub source: FilterSource,
}

/// Chooses between the learned path and the rule-based engine.
///
/// When the learned path is enabled it gets exactly one bounded attempt
/// per query; any failure falls back to the rules for the same query.
pub struct QueryInterpreter<E> {
    vocabulary: Arc<Vocabulary>,
    extractor: E,
    use_learned_path: bool,
    timeout: Duration,
    thresholds: Thresholds,
}

impl<E: FilterExtractor> QueryInterpreter<E> {
    pub fn new(vocabulary: Arc<Vocabulary>, config: &InterpreterConfig, extractor: E) -> Self {
        Self {
            vocabulary,
            extractor,
            use_learned_path: config.use_learned_path,
            timeout: Duration::from_secs(config.timeout_secs),
            thresholds: Thresholds {
                product_type: config.type_threshold,
                brand: config.brand_threshold,
            },
        }
    }

    /// Override the learned-path timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn uses_learned_path(&self) -> bool {
        self.use_learned_path
    }

    pub async fn resolve(&self, query: &str) -> Interpretation {
        if self.use_learned_path && !query.trim().is_empty() {
            match self.extract_bounded(query).await {
                Ok(filters) => {
                    tracing::debug!("Learned path filters for {query:?}: {filters:?}");
                    return Interpretation {
                        filters,
                        source: FilterSource::Learned,
                    };
                }
                Err(e) => {
                    tracing::warn!("Learned extraction failed, using rules: {e}");
                }
            }
        }

        Interpretation {
            filters: self.interpret_rules_blocking(query).await,
            source: FilterSource::Rules,
        }
    }

    /// The fuzzy scan covers every catalog title, so it runs on the blocking pool.
    async fn interpret_rules_blocking(&self, query: &str) -> FilterSet {
        let vocabulary = self.vocabulary.clone();
        let thresholds = self.thresholds;
        let q = query.to_string();

        match tokio::task::spawn_blocking(move || rules::interpret_with(&q, &vocabulary, thresholds))
            .await
        {
            Ok(filters) => filters,
            Err(e) => {
                tracing::error!("Rule-based interpretation task failed: {e}");
                FilterSet::default()
            }
        }
    }

    async fn extract_bounded(&self, query: &str) -> Result<FilterSet, ExtractError> {
        match tokio::time::timeout(self.timeout, self.extractor.extract(query, &self.vocabulary))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ExtractError::Timeout(self.timeout)),
        }
    }
}
