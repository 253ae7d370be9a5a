// adri-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum AdriError {
    // --- DOMAIN ERRORS (standards, rule parameters) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- FATAL: without a dataset there is nothing to assess ---
    #[error("Data unavailable from source '{source_name}': {reason}")]
    #[diagnostic(
        code(adri::data_unavailable),
        help("Check that the source exists and is readable, then run the assessment again.")
    )]
    DataUnavailable { source_name: String, reason: String },
}

impl AdriError {
    pub fn data_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        AdriError::DataUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

// Manual implementation to keep `?` ergonomic on raw IO calls
impl From<std::io::Error> for AdriError {
    fn from(err: std::io::Error) -> Self {
        AdriError::Infrastructure(InfrastructureError::Io(err))
    }
}
