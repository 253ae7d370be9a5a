// adri-core/src/domain/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::report::ReadinessLevel;
use crate::domain::rules::RuleSpec;
use crate::domain::scoring::WarningLog;
use crate::domain::standard::RuleCategory;

/// Engine configuration for one assessment. Every knob has a default, so an empty
/// document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssessmentConfig {
    #[serde(default)]
    pub readiness: ReadinessBands,

    #[serde(default)]
    pub validity: ValidityConfig,

    #[serde(default)]
    pub completeness: CompletenessConfig,

    #[serde(default)]
    pub freshness: FreshnessConfig,

    #[serde(default)]
    pub consistency: ConsistencyConfig,

    #[serde(default)]
    pub plausibility: PlausibilityConfig,

    /// Extra rule instantiations, each run in its declared dimension.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadinessBands {
    #[serde(default = "default_ready_minimum")]
    pub ready_minimum: f64,
    #[serde(default = "default_moderate_minimum")]
    pub moderate_minimum: f64,
}

fn default_ready_minimum() -> f64 {
    80.0
}

fn default_moderate_minimum() -> f64 {
    50.0
}

impl Default for ReadinessBands {
    fn default() -> Self {
        Self {
            ready_minimum: default_ready_minimum(),
            moderate_minimum: default_moderate_minimum(),
        }
    }
}

impl ReadinessBands {
    /// Bands clamped into [0, 100] with `moderate <= ready`.
    pub fn resolved(&self, log: &mut WarningLog) -> ReadinessBands {
        let ready = bounded(self.ready_minimum, default_ready_minimum(), "ready_minimum", log);
        let mut moderate = bounded(
            self.moderate_minimum,
            default_moderate_minimum(),
            "moderate_minimum",
            log,
        );
        if moderate > ready {
            log.push(format!(
                "readiness moderate_minimum {} exceeds ready_minimum {}; lowered to {}",
                moderate, ready, ready
            ));
            moderate = ready;
        }
        ReadinessBands {
            ready_minimum: ready,
            moderate_minimum: moderate,
        }
    }

    pub fn classify(&self, overall_score: f64) -> ReadinessLevel {
        if overall_score >= self.ready_minimum {
            ReadinessLevel::Ready
        } else if overall_score >= self.moderate_minimum {
            ReadinessLevel::Moderate
        } else {
            ReadinessLevel::Poor
        }
    }
}

fn bounded(value: f64, fallback: f64, name: &str, log: &mut WarningLog) -> f64 {
    if !value.is_finite() {
        log.push(format!("readiness {} is not a number; using {}", name, fallback));
        return fallback;
    }
    let clamped = value.clamp(0.0, 100.0);
    if clamped != value {
        log.push(format!("readiness {} {} clamped to {}", name, value, clamped));
    }
    clamped
}

/// Partial-credit fraction clamped into [0, 1], with a warning when adjusted.
pub fn resolve_credit(value: f64, name: &str, log: &mut WarningLog) -> f64 {
    if !value.is_finite() {
        log.push(format!("{} is not a number; treated as 0.0", name));
        return 0.0;
    }
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        log.push(format!("{} {} clamped to {}", name, value, clamped));
    }
    clamped
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidityConfig {
    /// Global weight per rule category. Unset categories use their default weight.
    #[serde(default)]
    pub rule_weights: BTreeMap<RuleCategory, f64>,

    /// field -> category -> weight, added on top of the global weights.
    /// Unknown categories and fields are tolerated here and reported as warnings.
    #[serde(default)]
    pub field_overrides: BTreeMap<String, BTreeMap<String, f64>>,

    /// Credit applied to inferred type consistency when no field requirement exists.
    #[serde(default = "default_implicit_credit")]
    pub implicit_credit: f64,
}

fn default_implicit_credit() -> f64 {
    0.7
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            rule_weights: BTreeMap::new(),
            field_overrides: BTreeMap::new(),
            implicit_credit: default_implicit_credit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletenessConfig {
    #[serde(default = "default_true")]
    pub treat_empty_strings_as_missing: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CompletenessConfig {
    fn default() -> Self {
        Self {
            treat_empty_strings_as_missing: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FreshnessConfig {
    /// Column holding record timestamps; detected from column names when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_field: Option<String>,

    #[serde(default = "default_reasonable_age_hours")]
    pub reasonable_age_hours: f64,

    /// Freshness SLA in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_hours: Option<f64>,

    /// Credit for evidence inferred from the data rather than stated in metadata.
    #[serde(default = "default_implicit_credit")]
    pub implicit_credit: f64,

    /// Credit for an SLA that only exists in configuration.
    #[serde(default = "default_configured_sla_credit")]
    pub configured_sla_credit: f64,
}

fn default_reasonable_age_hours() -> f64 {
    168.0
}

fn default_configured_sla_credit() -> f64 {
    0.5
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            timestamp_field: None,
            reasonable_age_hours: default_reasonable_age_hours(),
            max_age_hours: None,
            implicit_credit: default_implicit_credit(),
            configured_sla_credit: default_configured_sla_credit(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsistencyConfig {
    /// Key columns; the standard's `primary_key_fields` are used when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key_fields: Vec<String>,

    /// Weight per rule id (e.g. `consistency.primary_key`). Unset rules weigh 1.0.
    #[serde(default)]
    pub rule_weights: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlausibilityConfig {
    /// Weight per rule id (e.g. `plausibility.outliers`). Unset rules weigh 1.0.
    #[serde(default)]
    pub rule_weights: BTreeMap<String, f64>,

    /// Credit applied to statistically inferred plausibility.
    #[serde(default = "default_plausibility_credit")]
    pub implicit_credit: f64,
}

fn default_plausibility_credit() -> f64 {
    1.0
}

impl Default for PlausibilityConfig {
    fn default() -> Self {
        Self {
            rule_weights: BTreeMap::new(),
            implicit_credit: default_plausibility_credit(),
        }
    }
}

impl AssessmentConfig {
    pub fn with_rule_weight(mut self, category: RuleCategory, weight: f64) -> Self {
        self.validity.rule_weights.insert(category, weight);
        self
    }

    pub fn with_field_override(mut self, field: &str, category: &str, weight: f64) -> Self {
        self.validity
            .field_overrides
            .entry(field.to_string())
            .or_default()
            .insert(category.to_string(), weight);
        self
    }

    pub fn with_rule(mut self, spec: RuleSpec) -> Self {
        self.rules.push(spec);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_empty_document_yields_defaults() -> Result<()> {
        let config: AssessmentConfig = serde_yaml::from_str("{}")?;
        assert_eq!(config, AssessmentConfig::default());
        assert_eq!(config.freshness.reasonable_age_hours, 168.0);
        assert_eq!(config.validity.implicit_credit, 0.7);
        Ok(())
    }

    #[test]
    fn test_parse_weights_and_overrides() -> Result<()> {
        let yaml = r#"
validity:
  rule_weights:
    type: 0.5
    pattern: 0
  field_overrides:
    code:
      pattern: 2.0
      checksum: 1.0
rules:
  - id: plausibility.outliers
    params: { fields: [amount], multiplier: 3.0 }
"#;
        let config: AssessmentConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(config.validity.rule_weights[&RuleCategory::Type], 0.5);
        // unknown override categories survive parsing; resolution reports them
        assert_eq!(config.validity.field_overrides["code"]["checksum"], 1.0);
        assert_eq!(config.rules[0].id, "plausibility.outliers");
        Ok(())
    }

    #[test]
    fn test_unknown_global_category_is_rejected() {
        let parsed: Result<AssessmentConfig, _> =
            serde_yaml::from_str("validity:\n  rule_weights:\n    checksum: 1.0\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_bands_are_sanitized() {
        let mut log = WarningLog::new();
        let bands = ReadinessBands {
            ready_minimum: 150.0,
            moderate_minimum: f64::NAN,
        }
        .resolved(&mut log);
        assert_eq!(bands.ready_minimum, 100.0);
        assert_eq!(bands.moderate_minimum, 50.0);
        assert_eq!(log.entries().len(), 2);

        let bands = ReadinessBands::default();
        assert_eq!(bands.classify(80.0), ReadinessLevel::Ready);
        assert_eq!(bands.classify(79.9), ReadinessLevel::Moderate);
        assert_eq!(bands.classify(49.0), ReadinessLevel::Poor);
    }

    #[test]
    fn test_credit_is_clamped() {
        let mut log = WarningLog::new();
        assert_eq!(resolve_credit(1.4, "freshness.implicit_credit", &mut log), 1.0);
        assert_eq!(resolve_credit(0.5, "x", &mut log), 0.5);
        assert_eq!(log.entries().len(), 1);
    }
}
