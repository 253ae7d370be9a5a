// adri-core/src/ports/connector.rs

// What the engine needs from a data source, without knowing where the data lives.
// A connector owns its dataset; the engine only ever reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::dataset::Dataset;
use crate::error::AdriError;

pub trait DataConnector: Send + Sync {
    /// Fails with [`AdriError::DataUnavailable`] (or an I/O/parse error) when the source
    /// cannot be read. This is the only failure that aborts an assessment.
    fn get_data(&self) -> Result<Arc<Dataset>, AdriError>;

    fn get_name(&self) -> &str;

    fn get_type(&self) -> &str;

    fn get_metadata(&self) -> BTreeMap<String, JsonValue> {
        BTreeMap::new()
    }

    fn get_completeness_results(&self) -> Option<CompletenessResults> {
        None
    }

    fn get_freshness_results(&self) -> Option<FreshnessResults> {
        None
    }

    fn get_plausibility_results(&self) -> Option<PlausibilityResults> {
        None
    }
}

/// Completeness side-channel supplied by the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletenessResults {
    #[serde(default)]
    pub has_explicit_completeness_info: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_completeness_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_required_fields: Vec<String>,
}

/// Freshness side-channel supplied by the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FreshnessResults {
    #[serde(default)]
    pub has_explicit_freshness_info: bool,
    /// Age of the data at read time, in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_age_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Declared freshness SLA, in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_field: Option<String>,
}

/// Plausibility side-channel: results of checks the source already ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlausibilityResults {
    #[serde(default)]
    pub has_explicit_plausibility_info: bool,
    #[serde(default)]
    pub rule_results: Vec<ExplicitRuleResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplicitRuleResult {
    pub rule_id: String,
    pub passed: u64,
    pub total: u64,
}

/// Everything a connector can say about its source besides the data itself.
/// This is the shape of a metadata sidecar document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceMetadata {
    #[serde(default)]
    pub metadata: BTreeMap<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness: Option<CompletenessResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freshness: Option<FreshnessResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plausibility: Option<PlausibilityResults>,
}
