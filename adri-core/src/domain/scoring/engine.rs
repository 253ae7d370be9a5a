// adri-core/src/domain/scoring/engine.rs

use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::scoring::counts::{CategoryCount, RuleCountTable};
use crate::domain::scoring::explain::ExplainPayload;
use crate::domain::scoring::weights::{
    WarningLog, WeightedComponent, combine, resolve_field_overrides,
};
use crate::domain::standard::{RequirementSet, RuleCategory};

/// Outcome of one pass of the weighting engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    /// Weighted pass ratio in [0, 1]; `None` when no category was active.
    pub ratio: Option<f64>,
    pub explain: ExplainPayload,
}

/// Weighting engine over a count table.
///
/// 1. Only active categories (total > 0) enter the denominator; configured weights of
///    inactive categories are dropped.
/// 2. Negative weights are clamped, an all-zero set is equalized.
/// 3. Field overrides add `S_add` / `W_add`.
/// 4. Extra rule components (configured rules of the same dimension) join step 2 as
///    additional keys, after the categories.
pub fn score_categories(
    table: &RuleCountTable,
    requirements: &RequirementSet,
    global_weights: &BTreeMap<RuleCategory, f64>,
    field_overrides: &BTreeMap<String, BTreeMap<String, f64>>,
    rule_components: Vec<(WeightedComponent, CategoryCount)>,
    log: &mut WarningLog,
) -> EngineOutcome {
    let active = table.active_categories();

    for category in global_weights.keys() {
        if !active.contains(category) {
            debug!(category = %category, "Dropping weight of inactive rule category");
        }
    }

    let mut components: Vec<WeightedComponent> = active
        .iter()
        .map(|category| {
            let weight = global_weights
                .get(category)
                .copied()
                .unwrap_or_else(|| category.default_weight());
            let ratio = table.count(*category).pass_ratio().unwrap_or(1.0);
            WeightedComponent::new(category.as_str(), weight, ratio)
        })
        .collect();

    let mut explain = ExplainPayload::from_table(table);
    for (component, count) in rule_components {
        explain = explain.with_count(component.key.clone(), count);
        components.push(component);
    }

    let overrides = resolve_field_overrides(field_overrides, table, requirements, log);
    let weighted = combine(&components, overrides.contribution, log);

    EngineOutcome {
        ratio: weighted.ratio,
        explain: explain
            .with_global_weights(weighted.applied_map())
            .with_overrides(overrides.applied),
    }
}
