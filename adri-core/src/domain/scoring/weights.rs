// adri-core/src/domain/scoring/weights.rs

use std::collections::BTreeMap;
use tracing::warn;

use crate::domain::scoring::counts::RuleCountTable;
use crate::domain::standard::{RequirementSet, RuleCategory};

/// Uniform weight given to every active component when configured weights sum to zero.
pub const EQUALIZED_WEIGHT: f64 = 1.0;

/// Per-assessment accumulator of configuration anomalies.
/// Every entry is also emitted as a `tracing` warning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarningLog {
    entries: Vec<String>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.entries.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries
    }
}

/// An active scoring component (rule category or rule id) with its configured weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedComponent {
    pub key: String,
    pub configured_weight: f64,
    pub pass_ratio: f64,
}

impl WeightedComponent {
    pub fn new(key: impl Into<String>, configured_weight: f64, pass_ratio: f64) -> Self {
        Self {
            key: key.into(),
            configured_weight,
            pass_ratio,
        }
    }
}

/// Additive contribution of field overrides: `S_add` and `W_add`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdditiveContribution {
    pub score: f64,
    pub weight: f64,
}

/// Field overrides that survived resolution, plus their additive contribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOverrides {
    pub applied: BTreeMap<String, BTreeMap<String, f64>>,
    pub contribution: AdditiveContribution,
}

/// Result of the score composition step.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedScore {
    /// `numerator / denominator` in [0, 1]; `None` when nothing carried weight.
    pub ratio: Option<f64>,
    /// Resolved global weights, in component order.
    pub applied: Vec<(String, f64)>,
}

impl WeightedScore {
    pub fn applied_map(&self) -> BTreeMap<String, f64> {
        self.applied.iter().cloned().collect()
    }
}

/// Clamps negatives and non-finite weights to zero, then equalizes an all-zero set.
pub fn resolve_weights(components: &[WeightedComponent], log: &mut WarningLog) -> Vec<f64> {
    let mut weights: Vec<f64> = components
        .iter()
        .map(|c| sanitize(&c.key, c.configured_weight, log))
        .collect();

    if !weights.is_empty() && weights.iter().sum::<f64>() <= 0.0 {
        let keys: Vec<&str> = components.iter().map(|c| c.key.as_str()).collect();
        log.push(format!(
            "rule_weights were zero/invalid for active components [{}]; equalized to {} each",
            keys.join(", "),
            EQUALIZED_WEIGHT
        ));
        weights = vec![EQUALIZED_WEIGHT; components.len()];
    }

    weights
}

fn sanitize(key: &str, weight: f64, log: &mut WarningLog) -> f64 {
    if !weight.is_finite() {
        log.push(format!("invalid weight {} for '{}' treated as 0.0", weight, key));
        0.0
    } else if weight < 0.0 {
        log.push(format!("negative weight {} for '{}' clamped to 0.0", weight, key));
        0.0
    } else {
        weight
    }
}

/// Composes `Σ(w·ratio) + S_add` over `Σw + W_add`.
pub fn combine(
    components: &[WeightedComponent],
    additive: AdditiveContribution,
    log: &mut WarningLog,
) -> WeightedScore {
    let weights = resolve_weights(components, log);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (component, weight) in components.iter().zip(&weights) {
        numerator += weight * component.pass_ratio.clamp(0.0, 1.0);
        denominator += weight;
    }
    numerator += additive.score;
    denominator += additive.weight;

    let ratio = (denominator > 0.0).then(|| (numerator / denominator).clamp(0.0, 1.0));

    WeightedScore {
        ratio,
        applied: components
            .iter()
            .map(|c| c.key.clone())
            .zip(weights)
            .collect(),
    }
}

/// Resolves per-field overrides against the count table.
/// Unknown categories and unconstrained or absent fields are ignored with a warning.
/// Negative overrides are dropped from the applied set.
pub fn resolve_field_overrides(
    overrides: &BTreeMap<String, BTreeMap<String, f64>>,
    table: &RuleCountTable,
    requirements: &RequirementSet,
    log: &mut WarningLog,
) -> ResolvedOverrides {
    let mut resolved = ResolvedOverrides::default();

    for (field, categories) in overrides {
        if !requirements.contains(field) {
            log.push(format!(
                "field override for '{}' ignored: no field requirement declared",
                field
            ));
            continue;
        }
        if table.missing_fields.iter().any(|m| m == field) {
            log.push(format!(
                "field override for '{}' ignored: field absent from dataset",
                field
            ));
            continue;
        }

        for (category_name, weight) in categories {
            let Ok(category) = category_name.parse::<RuleCategory>() else {
                log.push(format!(
                    "field override '{}.{}' ignored: unknown rule category",
                    field, category_name
                ));
                continue;
            };
            if !weight.is_finite() {
                log.push(format!(
                    "invalid weight {} for override '{}.{}' dropped",
                    weight, field, category
                ));
                continue;
            }
            if *weight < 0.0 {
                log.push(format!(
                    "negative weight {} for override '{}.{}' dropped",
                    weight, field, category
                ));
                continue;
            }
            let Some(count) = table.field_count(field, category) else {
                log.push(format!(
                    "field override '{}.{}' ignored: category not configured for field",
                    field, category
                ));
                continue;
            };

            if let Some(ratio) = count.pass_ratio() {
                resolved.contribution.score += weight * ratio;
                resolved.contribution.weight += weight;
            }
            resolved
                .applied
                .entry(field.clone())
                .or_default()
                .insert(category.as_str().to_string(), *weight);
        }
    }

    resolved
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn components(weights: &[f64]) -> Vec<WeightedComponent> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| WeightedComponent::new(format!("c{}", i), *w, 1.0))
            .collect()
    }

    #[test]
    fn test_negative_weights_are_clamped_with_warning() {
        let mut log = WarningLog::new();
        let weights = resolve_weights(&components(&[0.5, -2.0]), &mut log);
        assert_eq!(weights, vec![0.5, 0.0]);
        assert_eq!(log.entries().len(), 1);
        assert!(log.entries()[0].contains("negative weight"));
    }

    #[test]
    fn test_all_zero_weights_are_equalized() {
        let mut log = WarningLog::new();
        let weights = resolve_weights(&components(&[0.0, -1.0, f64::NAN]), &mut log);
        assert_eq!(weights, vec![EQUALIZED_WEIGHT; 3]);
        assert!(log.entries().iter().any(|w| w.contains("zero/invalid")));
    }

    #[test]
    fn test_empty_component_set_stays_empty() {
        let mut log = WarningLog::new();
        assert!(resolve_weights(&[], &mut log).is_empty());
        assert!(log.is_empty());
        let score = combine(&[], AdditiveContribution::default(), &mut log);
        assert_eq!(score.ratio, None);
    }

    #[test]
    fn test_combine_weighted_ratio() {
        let mut log = WarningLog::new();
        let comps = vec![
            WeightedComponent::new("type", 3.0, 1.0),
            WeightedComponent::new("pattern", 1.0, 0.0),
        ];
        let score = combine(
            &comps,
            AdditiveContribution {
                score: 0.0,
                weight: 4.0,
            },
            &mut log,
        );
        assert_eq!(score.ratio, Some(3.0 / 8.0));
        assert_eq!(score.applied_map()["type"], 3.0);
    }
}
