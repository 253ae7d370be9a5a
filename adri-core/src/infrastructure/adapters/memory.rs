// adri-core/src/infrastructure/adapters/memory.rs

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::dataset::Dataset;
use crate::error::AdriError;
use crate::ports::connector::{
    CompletenessResults, DataConnector, FreshnessResults, PlausibilityResults, SourceMetadata,
};

pub const MEMORY_SOURCE_TYPE: &str = "memory";

/// Connector over a dataset that is already loaded. Side channels are set explicitly.
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    name: String,
    dataset: Arc<Dataset>,
    source: SourceMetadata,
}

impl InMemoryConnector {
    pub fn new(name: impl Into<String>, dataset: impl Into<Arc<Dataset>>) -> Self {
        Self {
            name: name.into(),
            dataset: dataset.into(),
            source: SourceMetadata::default(),
        }
    }

    pub fn with_source_metadata(mut self, source: SourceMetadata) -> Self {
        self.source = source;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.source.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_completeness(mut self, results: CompletenessResults) -> Self {
        self.source.completeness = Some(results);
        self
    }

    pub fn with_freshness(mut self, results: FreshnessResults) -> Self {
        self.source.freshness = Some(results);
        self
    }

    pub fn with_plausibility(mut self, results: PlausibilityResults) -> Self {
        self.source.plausibility = Some(results);
        self
    }
}

impl DataConnector for InMemoryConnector {
    fn get_data(&self) -> Result<Arc<Dataset>, AdriError> {
        Ok(Arc::clone(&self.dataset))
    }

    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_type(&self) -> &str {
        MEMORY_SOURCE_TYPE
    }

    fn get_metadata(&self) -> BTreeMap<String, JsonValue> {
        self.source.metadata.clone()
    }

    fn get_completeness_results(&self) -> Option<CompletenessResults> {
        self.source.completeness.clone()
    }

    fn get_freshness_results(&self) -> Option<FreshnessResults> {
        self.source.freshness.clone()
    }

    fn get_plausibility_results(&self) -> Option<PlausibilityResults> {
        self.source.plausibility.clone()
    }
}
