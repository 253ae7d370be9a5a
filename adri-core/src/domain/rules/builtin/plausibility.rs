// adri-core/src/domain/rules/builtin/plausibility.rs

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::domain::dataset::{Column, Dataset, ValueKind};
use crate::domain::dimensions::Dimension;
use crate::domain::error::DomainError;
use crate::domain::rules::{Rule, RuleDescriptor, RuleParams, RuleResult, default_rule_weight};
use crate::domain::scoring::CategoryCount;

pub const OUTLIER_RULE: &str = "plausibility.outliers";
pub const CATEGORICAL_FREQUENCY_RULE: &str = "plausibility.categorical_frequency";

fn target_columns<'d>(dataset: &'d Dataset, fields: &Option<Vec<String>>) -> Vec<&'d Column> {
    match fields {
        Some(fields) => fields.iter().filter_map(|f| dataset.column(f)).collect(),
        None => dataset.columns().iter().collect(),
    }
}

/// Quantile of a sorted slice with linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

// --- IQR outliers ---------------------------------------------------------

fn default_multiplier() -> f64 {
    1.5
}

fn default_min_samples() -> usize {
    4
}

/// Flags numeric values outside `[Q1 - k*IQR, Q3 + k*IQR]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlierRule {
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default = "default_rule_weight")]
    pub weight: f64,
}

impl Default for OutlierRule {
    fn default() -> Self {
        Self {
            fields: None,
            multiplier: default_multiplier(),
            min_samples: default_min_samples(),
            weight: default_rule_weight(),
        }
    }
}

impl OutlierRule {
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Rule for OutlierRule {
    fn id(&self) -> &str {
        OUTLIER_RULE
    }

    fn dimension(&self) -> Dimension {
        Dimension::Plausibility
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleResult {
        let mut count = CategoryCount::default();
        let mut findings = Vec::new();
        let mut outliers_by_column: BTreeMap<String, u64> = BTreeMap::new();

        for column in target_columns(dataset, &self.fields) {
            if column.dominant_kind() != Some(ValueKind::Number) {
                continue;
            }
            let mut values: Vec<f64> = column.non_null().filter_map(|v| v.as_f64()).collect();
            if values.len() < self.min_samples.max(1) {
                continue;
            }
            values.sort_by(|a, b| a.total_cmp(b));

            let q1 = quantile(&values, 0.25);
            let q3 = quantile(&values, 0.75);
            let iqr = q3 - q1;
            let (low, high) = (q1 - self.multiplier * iqr, q3 + self.multiplier * iqr);

            let mut column_count = CategoryCount::default();
            for v in &values {
                column_count.record((low..=high).contains(v));
            }
            if column_count.failed() > 0 {
                findings.push(format!(
                    "column '{}' has {} outlier(s) outside [{:.2}, {:.2}]",
                    column.name,
                    column_count.failed(),
                    low,
                    high
                ));
                outliers_by_column.insert(column.name.clone(), column_count.failed());
            }
            count.merge(column_count);
        }

        if count.total == 0 {
            return RuleResult::not_applicable(
                self.weight,
                format!(
                    "no numeric column with at least {} values to profile",
                    self.min_samples
                ),
            );
        }

        RuleResult::from_counts(self.weight, count, findings)
            .with_detail("multiplier", self.multiplier)
            .with_detail(
                "outliers",
                serde_json::to_value(&outliers_by_column).unwrap_or_default(),
            )
    }

    fn generate_narrative(&self, result: &RuleResult) -> String {
        let total = result.detail_u64("total").unwrap_or(0);
        let failed = result.detail_u64("failed").unwrap_or(0);
        if total == 0 {
            return "No numeric column could be profiled for outliers.".to_string();
        }
        format!(
            "{} of {} numeric values fall outside the {}x IQR fences.",
            failed, total, self.multiplier
        )
    }
}

// --- Categorical frequency ------------------------------------------------

fn default_min_frequency() -> f64 {
    0.01
}

fn default_max_cardinality() -> usize {
    50
}

/// Flags values of low-cardinality text columns whose category is rarer than
/// `min_frequency`. Columns where every value is distinct are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoricalFrequencyRule {
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default = "default_min_frequency")]
    pub min_frequency: f64,
    #[serde(default = "default_max_cardinality")]
    pub max_cardinality: usize,
    #[serde(default = "default_rule_weight")]
    pub weight: f64,
}

impl Default for CategoricalFrequencyRule {
    fn default() -> Self {
        Self {
            fields: None,
            min_frequency: default_min_frequency(),
            max_cardinality: default_max_cardinality(),
            weight: default_rule_weight(),
        }
    }
}

impl CategoricalFrequencyRule {
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Rule for CategoricalFrequencyRule {
    fn id(&self) -> &str {
        CATEGORICAL_FREQUENCY_RULE
    }

    fn dimension(&self) -> Dimension {
        Dimension::Plausibility
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleResult {
        let mut count = CategoryCount::default();
        let mut findings = Vec::new();

        for column in target_columns(dataset, &self.fields) {
            if column.dominant_kind() != Some(ValueKind::Text) {
                continue;
            }
            let mut frequencies: BTreeMap<String, u64> = BTreeMap::new();
            for value in column.non_null() {
                *frequencies.entry(value.as_text().trim().to_string()).or_insert(0) += 1;
            }
            let observed: u64 = frequencies.values().sum();
            if frequencies.len() > self.max_cardinality || frequencies.len() as u64 >= observed {
                continue;
            }

            let rare: Vec<(&String, &u64)> = frequencies
                .iter()
                .filter(|(_, n)| (**n as f64 / observed as f64) < self.min_frequency)
                .collect();
            let rare_values: u64 = rare.iter().map(|(_, n)| **n).sum();
            count.merge(CategoryCount::new(observed, observed - rare_values));

            if !rare.is_empty() {
                let names: Vec<&str> = rare.iter().map(|(k, _)| k.as_str()).collect();
                findings.push(format!(
                    "column '{}' has rare categories below {:.1}%: {}",
                    column.name,
                    self.min_frequency * 100.0,
                    names.join(", ")
                ));
            }
        }

        if count.total == 0 {
            return RuleResult::not_applicable(
                self.weight,
                "no low-cardinality categorical column to profile",
            );
        }
        RuleResult::from_counts(self.weight, count, findings)
            .with_detail("min_frequency", self.min_frequency)
    }
}

pub(super) fn descriptors() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor::new(
            OUTLIER_RULE,
            Dimension::Plausibility,
            "Numeric values outside IQR fences",
            |params: &RuleParams| {
                let rule: OutlierRule = params.parse(OUTLIER_RULE)?;
                // A negative multiplier inverts the fences and flags every value
                if !rule.multiplier.is_finite() || rule.multiplier < 0.0 {
                    return Err(DomainError::InvalidRuleParams {
                        rule: OUTLIER_RULE.to_string(),
                        reason: format!(
                            "'multiplier' must be a non-negative number, got {}",
                            rule.multiplier
                        ),
                    });
                }
                Ok(Box::new(rule) as Box<dyn Rule>)
            },
        ),
        RuleDescriptor::new(
            CATEGORICAL_FREQUENCY_RULE,
            Dimension::Plausibility,
            "Rare categories in low-cardinality text columns",
            |params: &RuleParams| {
                let rule: CategoricalFrequencyRule = params.parse(CATEGORICAL_FREQUENCY_RULE)?;
                if !(0.0..=1.0).contains(&rule.min_frequency) {
                    return Err(DomainError::InvalidRuleParams {
                        rule: CATEGORICAL_FREQUENCY_RULE.to_string(),
                        reason: format!(
                            "'min_frequency' must lie in [0, 1], got {}",
                            rule.min_frequency
                        ),
                    });
                }
                Ok(Box::new(rule) as Box<dyn Rule>)
            },
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Value;
    use anyhow::Result;

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), 1.75);
        assert_eq!(quantile(&sorted, 0.75), 3.25);
        assert_eq!(quantile(&[5.0], 0.5), 5.0);
    }

    #[test]
    fn test_outlier_detection() -> Result<()> {
        let ds = Dataset::builder()
            .column("amount", vec![10, 11, 12, 13, 12, 11, 500])
            .build()?;
        let result = OutlierRule::default().evaluate(&ds);
        assert_eq!(result.counts(), CategoryCount::new(7, 6));
        assert!(result.findings[0].contains("amount"));
        Ok(())
    }

    #[test]
    fn test_outliers_need_enough_samples() -> Result<()> {
        let ds = Dataset::builder().column("amount", vec![1, 1000]).build()?;
        let result = OutlierRule::default().evaluate(&ds);
        assert!(!result.is_applicable());
        assert_eq!(result.score, 1.0);
        Ok(())
    }

    #[test]
    fn test_rare_categories() -> Result<()> {
        let mut values: Vec<Value> = (0..99).map(|_| Value::from("common")).collect();
        values.push(Value::from("odd"));
        values.push(Value::from("common"));
        values.push(Value::Null);
        let ds = Dataset::builder().column("kind", values).build()?;

        let rule = CategoricalFrequencyRule {
            min_frequency: 0.02,
            ..Default::default()
        };
        let result = rule.evaluate(&ds);
        assert_eq!(result.counts(), CategoryCount::new(101, 100));
        assert!(result.findings[0].contains("odd"));
        Ok(())
    }

    #[test]
    fn test_identifier_like_columns_are_skipped() -> Result<()> {
        let ds = Dataset::builder().column("name", vec!["a", "b", "c"]).build()?;
        assert!(!CategoricalFrequencyRule::default().evaluate(&ds).is_applicable());
        Ok(())
    }

    fn factory(id: &str) -> RuleDescriptor {
        descriptors().into_iter().find(|d| d.id == id).unwrap()
    }

    #[test]
    fn test_outlier_factory_rejects_inverted_fences() {
        let outliers = factory(OUTLIER_RULE);
        assert!(outliers.instantiate(&RuleParams::new()).is_ok());

        for multiplier in [-5.0, f64::NAN] {
            let err = outliers
                .instantiate(&RuleParams::new().with("multiplier", multiplier))
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidRuleParams { .. }));
        }
    }

    #[test]
    fn test_frequency_factory_rejects_out_of_range_share() {
        let frequency = factory(CATEGORICAL_FREQUENCY_RULE);
        assert!(
            frequency
                .instantiate(&RuleParams::new().with("min_frequency", 0.05))
                .is_ok()
        );
        for share in [-0.1, 1.5] {
            assert!(
                frequency
                    .instantiate(&RuleParams::new().with("min_frequency", share))
                    .is_err()
            );
        }
    }
}
