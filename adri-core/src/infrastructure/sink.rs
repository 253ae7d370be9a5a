// adri-core/src/infrastructure/sink.rs

use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::report::AssessmentReport;
use crate::error::AdriError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::sink::ReportSink;

/// Writes the export envelope as pretty JSON, atomically.
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    path: PathBuf,
}

impl JsonReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonReportSink {
    fn write(&self, report: &AssessmentReport) -> Result<(), AdriError> {
        let body = report
            .to_json_pretty()
            .map_err(InfrastructureError::JsonError)?;
        atomic_write(&self.path, body)?;
        info!(path = ?self.path, source = report.source_name(), "Report written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dimensions::Dimension;
    use anyhow::Result;

    #[test]
    fn test_written_report_parses_back() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let sink = JsonReportSink::new(dir.path().join("out").join("report.json"));
        let report = AssessmentReport::builder("orders", "csv")
            .score(Dimension::Validity, 18.0)
            .score(Dimension::Completeness, 20.0)
            .build();

        sink.write(&report)?;

        let raw = std::fs::read_to_string(sink.path())?;
        let json: serde_json::Value = serde_json::from_str(&raw)?;
        let root = &json["adri_assessment_report"];
        assert_eq!(root["metadata"]["source_name"], "orders");
        assert_eq!(root["summary"]["overall_score"], 38.0);
        Ok(())
    }
}
