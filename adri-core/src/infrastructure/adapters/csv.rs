// adri-core/src/infrastructure/adapters/csv.rs

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::dataset::{Column, Dataset, Value};
use crate::error::AdriError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::connector::{
    CompletenessResults, DataConnector, FreshnessResults, PlausibilityResults, SourceMetadata,
};

pub const CSV_SOURCE_TYPE: &str = "csv";

/// Reads a headed CSV file on every `get_data` call; cells are typed with [`Value::infer`].
///
/// Without explicit freshness metadata the file's modification time is offered as
/// inferred `last_updated` evidence.
#[derive(Debug, Clone)]
pub struct CsvConnector {
    path: PathBuf,
    name: String,
    delimiter: u8,
    source: SourceMetadata,
}

impl CsvConnector {
    /// Named after the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            delimiter: b',',
            source: SourceMetadata::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_source_metadata(mut self, source: SourceMetadata) -> Self {
        self.source = source;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_columns(&self) -> Result<Vec<Column>, InfrastructureError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::Headers)
            .from_path(&self.path)?;

        let mut columns: Vec<Column> = reader
            .headers()?
            .iter()
            .map(|h| Column::new(h, Vec::new()))
            .collect();

        for record in reader.records() {
            let record = record?;
            for (column, cell) in columns.iter_mut().zip(record.iter()) {
                column.values.push(Value::infer(cell));
            }
        }
        Ok(columns)
    }

    fn modified_at(&self) -> Option<DateTime<Utc>> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}

impl DataConnector for CsvConnector {
    #[instrument(skip(self), fields(path = ?self.path))]
    fn get_data(&self) -> Result<Arc<Dataset>, AdriError> {
        let columns = self
            .read_columns()
            .map_err(|e| AdriError::data_unavailable(&self.name, e))?;
        let dataset =
            Dataset::new(columns).map_err(|e| AdriError::data_unavailable(&self.name, e))?;
        debug!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "CSV loaded"
        );
        Ok(Arc::new(dataset))
    }

    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_type(&self) -> &str {
        CSV_SOURCE_TYPE
    }

    fn get_metadata(&self) -> BTreeMap<String, JsonValue> {
        let mut metadata = self.source.metadata.clone();
        metadata
            .entry("path".to_string())
            .or_insert_with(|| JsonValue::String(self.path.display().to_string()));
        metadata
    }

    fn get_completeness_results(&self) -> Option<CompletenessResults> {
        self.source.completeness.clone()
    }

    fn get_freshness_results(&self) -> Option<FreshnessResults> {
        match &self.source.freshness {
            Some(explicit) => Some(explicit.clone()),
            None => self.modified_at().map(|at| FreshnessResults {
                has_explicit_freshness_info: false,
                last_updated: Some(at),
                ..FreshnessResults::default()
            }),
        }
    }

    fn get_plausibility_results(&self) -> Option<PlausibilityResults> {
        self.source.plausibility.clone()
    }
}
