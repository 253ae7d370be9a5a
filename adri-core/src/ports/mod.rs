// adri-core/src/ports/mod.rs

pub mod connector;
pub mod sink;

pub use connector::{
    CompletenessResults, DataConnector, ExplicitRuleResult, FreshnessResults,
    PlausibilityResults, SourceMetadata,
};
pub use sink::ReportSink;
