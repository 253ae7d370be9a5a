pub mod compliance;
pub mod configuration;
pub mod dataset;
pub mod dimensions;
pub mod error;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod standard;

pub use error::DomainError;
