// adri-core/src/domain/dimensions/mod.rs

pub mod completeness;
pub mod consistency;
pub mod freshness;
pub mod plausibility;
pub mod validity;

pub use completeness::CompletenessAssessor;
pub use consistency::ConsistencyAssessor;
pub use freshness::FreshnessAssessor;
pub use plausibility::PlausibilityAssessor;
pub use validity::ValidityAssessor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::configuration::AssessmentConfig;
use crate::domain::dataset::Dataset;
use crate::domain::rules::Rule;
use crate::domain::scoring::{CategoryCount, ExplainPayload, WeightedComponent};
use crate::domain::standard::RequirementSet;
use crate::ports::connector::DataConnector;

/// Point ceiling of every dimension.
pub const MAX_DIMENSION_SCORE: f64 = 20.0;

/// The five orthogonal data-quality axes, in their fixed assessment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Validity,
    Completeness,
    Freshness,
    Consistency,
    Plausibility,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Validity,
        Dimension::Completeness,
        Dimension::Freshness,
        Dimension::Consistency,
        Dimension::Plausibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validity => "validity",
            Self::Completeness => "completeness",
            Self::Freshness => "freshness",
            Self::Consistency => "consistency",
            Self::Plausibility => "plausibility",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "validity" => Ok(Self::Validity),
            "completeness" => Ok(Self::Completeness),
            "freshness" => Ok(Self::Freshness),
            "consistency" => Ok(Self::Consistency),
            "plausibility" => Ok(Self::Plausibility),
            _ => Err(format!("Unknown dimension: {}", s)),
        }
    }
}

/// Outcome of one dimension: a bounded sub-score plus its evidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionResult {
    pub dimension: Dimension,
    pub score: f64,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<ExplainPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DimensionResult {
    /// Score is clamped into [0, 20]; a non-finite score collapses to 0.
    pub fn new(dimension: Dimension, score: f64) -> Self {
        Self {
            dimension,
            score: clamp_score(score),
            findings: Vec::new(),
            recommendations: Vec::new(),
            explain: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_findings(mut self, findings: Vec<String>) -> Self {
        self.findings = findings;
        self
    }

    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn with_explain(mut self, explain: ExplainPayload) -> Self {
        self.explain = Some(explain);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, MAX_DIMENSION_SCORE)
    } else {
        0.0
    }
}

/// Partial credit: `floor(ceiling * credit)`, never rounded up.
pub(crate) fn partial_credit(ceiling: f64, credit: f64) -> f64 {
    (ceiling * credit.clamp(0.0, 1.0)).floor()
}

/// Partial credit for inferred evidence; full credit leaves the score untouched.
pub(crate) fn apply_credit(score: f64, credit: f64) -> f64 {
    if credit >= 1.0 {
        score
    } else {
        partial_credit(score, credit)
    }
}

/// Applicable rule outcomes, ready for the weight resolver.
#[derive(Debug, Default)]
pub(crate) struct RuleRun {
    pub components: Vec<(WeightedComponent, CategoryCount)>,
    pub findings: Vec<String>,
}

/// Evaluates rules in order. Non-applicable rules only contribute their finding.
/// `weights` overrides a rule's own weight by rule id.
pub(crate) fn run_rules<'r>(
    rules: impl IntoIterator<Item = &'r dyn Rule>,
    dataset: &Dataset,
    weights: &BTreeMap<String, f64>,
) -> RuleRun {
    let mut run = RuleRun::default();
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();

    for rule in rules {
        let result = rule.evaluate(dataset);
        run.findings.extend(result.findings.iter().cloned());
        if !result.is_applicable() {
            continue;
        }

        let occurrence = seen.entry(rule.id().to_string()).or_insert(0);
        *occurrence += 1;
        let key = if *occurrence == 1 {
            rule.id().to_string()
        } else {
            format!("{}[{}]", rule.id(), occurrence)
        };
        let weight = weights.get(rule.id()).copied().unwrap_or_else(|| rule.weight());

        run.components.push((
            WeightedComponent::new(key, weight, result.pass_ratio()),
            result.counts(),
        ));
    }
    run
}

/// Everything a dimension assessor may read during one assessment call.
pub struct AssessmentContext<'a> {
    pub dataset: &'a Dataset,
    pub connector: &'a dyn DataConnector,
    pub requirements: &'a RequirementSet,
    pub primary_key_fields: &'a [String],
    pub config: &'a AssessmentConfig,
    pub rules: &'a [Box<dyn Rule>],
    pub as_of: DateTime<Utc>,
}

impl<'a> AssessmentContext<'a> {
    /// Configured rules scoped to a dimension, in configuration order.
    pub fn rules_for(&self, dimension: Dimension) -> impl Iterator<Item = &'a dyn Rule> + 'a {
        let rules: &'a [Box<dyn Rule>] = self.rules;
        rules
            .iter()
            .filter(move |r| r.dimension() == dimension)
            .map(|r| r.as_ref())
    }
}

/// One assessor per dimension. Never fails: missing or malformed data
/// yields a zero or partial score with a finding naming what was missing.
pub trait DimensionAssessor: Send + Sync {
    fn dimension(&self) -> Dimension;

    fn assess(&self, ctx: &AssessmentContext<'_>) -> DimensionResult;
}
