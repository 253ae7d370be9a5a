// adri-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid standard '{standard}': {reason}")]
    #[diagnostic(
        code(adri::domain::standard),
        help("Check the 'template' and 'requirements' sections of the standard document.")
    )]
    InvalidStandard { standard: String, reason: String },

    #[error("Invalid requirement for field '{field}': {reason}")]
    #[diagnostic(code(adri::domain::field_requirement))]
    InvalidFieldRequirement { field: String, reason: String },

    #[error("Rule '{0}' is not registered")]
    #[diagnostic(
        code(adri::domain::unknown_rule),
        help("Register the rule before referencing it, or run `adri rules` to list known rules.")
    )]
    UnknownRule(String),

    #[error("Invalid parameters for rule '{rule}': {reason}")]
    #[diagnostic(code(adri::domain::rule_params))]
    InvalidRuleParams { rule: String, reason: String },

    #[error("Malformed dataset: {0}")]
    #[diagnostic(
        code(adri::domain::dataset),
        help("Every column of a dataset must hold the same number of values.")
    )]
    MalformedDataset(String),
}
