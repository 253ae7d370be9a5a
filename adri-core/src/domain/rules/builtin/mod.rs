// adri-core/src/domain/rules/builtin/mod.rs

pub mod consistency;
pub mod plausibility;
pub mod validity;

pub use consistency::{CalculationRule, CrossFieldRule, PrimaryKeyRule, TypeHomogeneityRule};
pub use plausibility::{CategoricalFrequencyRule, OutlierRule};
pub use validity::FieldCheckRule;

use crate::domain::rules::RuleDescriptor;

/// Every rule shipped with the crate.
pub fn descriptors() -> Vec<RuleDescriptor> {
    let mut all = validity::descriptors();
    all.extend(consistency::descriptors());
    all.extend(plausibility::descriptors());
    all
}
