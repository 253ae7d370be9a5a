// adri-core/src/domain/scoring/explain.rs

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::scoring::counts::{CategoryCount, RuleCountTable};

/// Audit trail of a weighted dimension score.
/// Keys and nesting are part of the export contract; values are not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExplainPayload {
    pub rule_counts: BTreeMap<String, CategoryCount>,
    pub per_field_counts: BTreeMap<String, BTreeMap<String, CategoryCount>>,
    pub applied_weights: AppliedWeights,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppliedWeights {
    pub global: BTreeMap<String, f64>,
    pub overrides: BTreeMap<String, BTreeMap<String, f64>>,
}

impl ExplainPayload {
    /// Seeds `rule_counts` and `per_field_counts` from the count phase.
    pub fn from_table(table: &RuleCountTable) -> Self {
        let rule_counts = table
            .rule_counts
            .iter()
            .map(|(category, count)| (category.as_str().to_string(), *count))
            .collect();
        let per_field_counts = table
            .per_field_counts
            .iter()
            .map(|(field, counts)| {
                let counts = counts
                    .iter()
                    .map(|(category, count)| (category.as_str().to_string(), *count))
                    .collect();
                (field.clone(), counts)
            })
            .collect();

        Self {
            rule_counts,
            per_field_counts,
            applied_weights: AppliedWeights::default(),
        }
    }

    pub fn with_count(mut self, key: impl Into<String>, count: CategoryCount) -> Self {
        self.rule_counts.insert(key.into(), count);
        self
    }

    pub fn with_global_weights(mut self, global: BTreeMap<String, f64>) -> Self {
        self.applied_weights.global = global;
        self
    }

    pub fn with_overrides(mut self, overrides: BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        self.applied_weights.overrides = overrides;
        self
    }
}
