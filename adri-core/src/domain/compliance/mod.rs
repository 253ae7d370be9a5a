// adri-core/src/domain/compliance/mod.rs

pub mod evaluator;

pub use evaluator::{
    ComplianceGap, FieldGap, OVERALL_REQUIREMENT, TemplateEvaluation, TemplateEvaluator,
};
