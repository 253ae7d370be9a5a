// adri-core/src/ports/sink.rs

use crate::domain::report::AssessmentReport;
use crate::error::AdriError;

/// Consumer of finished reports (file, HTTP endpoint, audit log...).
pub trait ReportSink: Send + Sync {
    fn write(&self, report: &AssessmentReport) -> Result<(), AdriError>;
}
