// adri-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod error;
pub mod fs;
pub mod sink;

pub use adapters::{CsvConnector, InMemoryConnector};
pub use sink::JsonReportSink;
