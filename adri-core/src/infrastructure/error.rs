// adri-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(adri::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(adri::infra::yaml),
        help("Check your YAML syntax (indentation, types, unknown keys).")
    )]
    YamlError(#[from] serde_yaml::Error),

    // --- REPORT EXPORT ---
    #[error("JSON Serialization Error: {0}")]
    #[diagnostic(code(adri::infra::json))]
    JsonError(#[from] serde_json::Error),

    // --- CSV SOURCES ---
    #[error("CSV Parsing Error: {0}")]
    #[diagnostic(
        code(adri::infra::csv),
        help("Check the delimiter, the header row and that every record has the same width.")
    )]
    CsvError(#[from] csv::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(adri::infra::config))]
    ConfigError(String),

    #[error("Configuration not found: {0}")]
    #[diagnostic(code(adri::infra::config_missing))]
    ConfigNotFound(String),
}
