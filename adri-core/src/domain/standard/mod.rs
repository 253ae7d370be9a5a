// adri-core/src/domain/standard/mod.rs

pub mod requirement;
pub mod template;

pub use requirement::{CompiledRequirement, FieldRequirement, RequirementSet, RuleCategory};
pub use template::{
    CertificationPolicy, DimensionRequirement, Requirements, Standard, TemplateInfo,
};
