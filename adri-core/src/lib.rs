// adri-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness: assessment is observational and must never panic the caller's pipeline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts for the outside world: data connectors and report sinks.
pub mod ports;

// 2. Domain (Scoring core)
// Dataset model, rules, weighting engine, dimensions, report, compliance.
// Depends on nothing but itself.
pub mod domain;

// 3. Infrastructure (Adapters)
// YAML config & standards, CSV / in-memory connectors, JSON sink.
pub mod infrastructure;

// 4. Application (Use Cases)
// Assessor composition root and the data guard.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use application::{Assessor, DataGuard, GuardDecision, GuardVerdict, OnFailure};
pub use domain::compliance::{TemplateEvaluation, TemplateEvaluator};
pub use domain::dataset::{Dataset, Value};
pub use domain::dimensions::Dimension;
pub use domain::report::{AssessmentReport, ReadinessLevel};
pub use domain::standard::Standard;
pub use error::AdriError;
pub use infrastructure::{CsvConnector, InMemoryConnector, JsonReportSink};
pub use ports::{DataConnector, ReportSink};

/// Version stamped into every exported report.
pub const ADRI_VERSION: &str = env!("CARGO_PKG_VERSION");
