// adri-core/src/domain/rules/mod.rs

pub mod builtin;
pub mod registry;

pub use registry::RuleRegistry;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

use crate::domain::dataset::Dataset;
use crate::domain::dimensions::Dimension;
use crate::domain::error::DomainError;
use crate::domain::scoring::CategoryCount;

pub(crate) fn default_rule_weight() -> f64 {
    1.0
}

/// Outcome of a single rule invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    /// Partial contribution in `[0, weight]`.
    pub score: f64,
    pub valid: bool,
    pub findings: Vec<String>,
    pub details: Map<String, JsonValue>,
    #[serde(skip)]
    ceiling: f64,
}

impl RuleResult {
    /// Score proportional to `passed / total`. Nothing checked counts as a full pass.
    pub fn from_counts(weight: f64, count: CategoryCount, findings: Vec<String>) -> Self {
        let ceiling = ceiling_of(weight);
        let ratio = count.pass_ratio().unwrap_or(1.0);
        let mut details = Map::new();
        details.insert("total".into(), count.total.into());
        details.insert("passed".into(), count.passed.into());
        details.insert("failed".into(), count.failed().into());
        details.insert("pass_ratio".into(), ratio.into());
        Self {
            score: ceiling * ratio,
            valid: count.failed() == 0,
            findings,
            details,
            ceiling,
        }
    }

    /// Neutral, maximal result for a rule that does not apply to this dataset.
    pub fn not_applicable(weight: f64, finding: impl Into<String>) -> Self {
        let ceiling = ceiling_of(weight);
        let mut details = Map::new();
        details.insert("applicable".into(), false.into());
        Self {
            score: ceiling,
            valid: true,
            findings: vec![finding.into()],
            details,
            ceiling,
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn is_applicable(&self) -> bool {
        self.details
            .get("applicable")
            .and_then(JsonValue::as_bool)
            .unwrap_or(true)
    }

    /// `score / weight`; 1.0 when the weight is zero.
    pub fn pass_ratio(&self) -> f64 {
        if self.ceiling > 0.0 {
            (self.score / self.ceiling).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Tallies recorded in `details`. A non-applicable rule reports no checks.
    pub fn counts(&self) -> CategoryCount {
        if !self.is_applicable() {
            return CategoryCount::default();
        }
        match (self.detail_u64("total"), self.detail_u64("passed")) {
            (Some(total), Some(passed)) => CategoryCount::new(total, passed),
            _ => CategoryCount::new(1, u64::from(self.valid)),
        }
    }

    pub fn detail_u64(&self, key: &str) -> Option<u64> {
        self.details.get(key).and_then(JsonValue::as_u64)
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(JsonValue::as_str)
    }
}

fn ceiling_of(weight: f64) -> f64 {
    if weight.is_finite() { weight.max(0.0) } else { 0.0 }
}

/// A pluggable diagnostic check. `evaluate` is a pure function of the dataset and the
/// rule's parameters, and must not fail on absent columns, all-null columns or empty
/// datasets: it returns [`RuleResult::not_applicable`] instead.
pub trait Rule: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn dimension(&self) -> Dimension;

    fn weight(&self) -> f64 {
        default_rule_weight()
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleResult;

    /// One sentence summarizing `details`. Missing keys fall back to conservative defaults.
    fn generate_narrative(&self, result: &RuleResult) -> String {
        if !result.is_applicable() {
            let reason = result
                .findings
                .first()
                .map(String::as_str)
                .unwrap_or("no applicable data");
            return format!("Rule '{}' did not apply: {}.", self.id(), reason);
        }
        let passed = result.detail_u64("passed").unwrap_or(0);
        let total = result.detail_u64("total").unwrap_or(0);
        if total == 0 {
            return format!("Rule '{}' found nothing to check.", self.id());
        }
        format!(
            "Rule '{}' passed {} of {} checks ({:.1}%).",
            self.id(),
            passed,
            total,
            passed as f64 / total as f64 * 100.0
        )
    }
}

/// Free-form rule parameters, deserialized into a typed struct by each factory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleParams(Map<String, JsonValue>);

impl RuleParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    /// Deserializes into the rule's typed parameters.
    pub fn parse<T: DeserializeOwned>(&self, rule: &str) -> Result<T, DomainError> {
        serde_json::from_value(JsonValue::Object(self.0.clone())).map_err(|e| {
            DomainError::InvalidRuleParams {
                rule: rule.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl From<Map<String, JsonValue>> for RuleParams {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

/// A rule instantiation request: registry id plus parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub id: String,
    #[serde(default)]
    pub params: RuleParams,
}

impl RuleSpec {
    pub fn new(id: impl Into<String>, params: RuleParams) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }
}

pub type RuleFactory =
    Arc<dyn Fn(&RuleParams) -> Result<Box<dyn Rule>, DomainError> + Send + Sync>;

/// Registry entry: identity plus a constructor from parameters.
#[derive(Clone)]
pub struct RuleDescriptor {
    pub id: String,
    pub dimension: Dimension,
    pub description: String,
    factory: RuleFactory,
}

impl RuleDescriptor {
    pub fn new<F>(
        id: impl Into<String>,
        dimension: Dimension,
        description: impl Into<String>,
        factory: F,
    ) -> Self
    where
        F: Fn(&RuleParams) -> Result<Box<dyn Rule>, DomainError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            dimension,
            description: description.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn instantiate(&self, params: &RuleParams) -> Result<Box<dyn Rule>, DomainError> {
        (self.factory)(params)
    }
}

impl fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("id", &self.id)
            .field("dimension", &self.dimension)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
