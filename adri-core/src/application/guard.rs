// adri-core/src/application/guard.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::application::assessor::Assessor;
use crate::domain::compliance::{TemplateEvaluation, TemplateEvaluator};
use crate::domain::configuration::AssessmentConfig;
use crate::domain::dataset::Dataset;
use crate::domain::report::AssessmentReport;
use crate::domain::standard::Standard;
use crate::error::AdriError;
use crate::infrastructure::adapters::InMemoryConnector;
use crate::ports::connector::DataConnector;

/// What to do with data that does not meet the standard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnFailure {
    #[default]
    Block,
    Warn,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    AllowWithWarnings,
    Block,
}

impl fmt::Display for GuardDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Allow => "allow",
            Self::AllowWithWarnings => "allow_with_warnings",
            Self::Block => "block",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub struct GuardVerdict {
    pub allowed: bool,
    pub decision: GuardDecision,
    pub report: AssessmentReport,
    pub evaluation: TemplateEvaluation,
}

/// Gate in front of an agent workflow: assess, evaluate, decide.
/// A failed standard is a `Block` verdict, never an error.
pub struct DataGuard {
    assessor: Assessor,
    standard: Standard,
    on_failure: OnFailure,
}

impl DataGuard {
    pub fn new(standard: Standard, config: AssessmentConfig) -> Result<Self, AdriError> {
        let assessor = Assessor::new(config).with_standard(standard.clone())?;
        Ok(Self {
            assessor,
            standard,
            on_failure: OnFailure::default(),
        })
    }

    /// Uses a pre-built assessor; its own standard (if any) is replaced by `standard`.
    pub fn with_assessor(assessor: Assessor, standard: Standard) -> Result<Self, AdriError> {
        Ok(Self {
            assessor: assessor.with_standard(standard.clone())?,
            standard,
            on_failure: OnFailure::default(),
        })
    }

    pub fn on_failure(mut self, mode: OnFailure) -> Self {
        self.on_failure = mode;
        self
    }

    pub fn standard(&self) -> &Standard {
        &self.standard
    }

    #[instrument(skip_all, fields(standard = %self.standard.id(), source = %connector.get_name()))]
    pub fn check(&self, connector: &dyn DataConnector) -> Result<GuardVerdict, AdriError> {
        let report = self.assessor.assess(connector)?;
        let evaluation = TemplateEvaluator::evaluate(&report, &self.standard);

        let decision = if evaluation.compliant {
            GuardDecision::Allow
        } else {
            match self.on_failure {
                OnFailure::Block => GuardDecision::Block,
                OnFailure::Warn => {
                    warn!(
                        score = report.overall_score(),
                        gaps = evaluation.gaps.len(),
                        "Data does not meet the standard; continuing with warnings"
                    );
                    GuardDecision::AllowWithWarnings
                }
                OnFailure::Continue => {
                    debug!(gaps = evaluation.gaps.len(), "Standard not met; continuing");
                    GuardDecision::Allow
                }
            }
        };

        Ok(GuardVerdict {
            allowed: decision != GuardDecision::Block,
            decision,
            report,
            evaluation,
        })
    }

    /// Convenience for data already in memory.
    pub fn check_dataset(
        &self,
        name: &str,
        dataset: impl Into<Arc<Dataset>>,
    ) -> Result<GuardVerdict, AdriError> {
        self.check(&InMemoryConnector::new(name, dataset))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dimensions::Dimension;
    use crate::domain::standard::FieldRequirement;

    fn customers() -> Dataset {
        Dataset::builder()
            .column("id", vec![1, 2, 3, 4])
            .column("email", vec!["a@x.io", "b@x.io", "c@x.io", "d@x.io"])
            .build()
            .unwrap()
    }

    fn strict_standard() -> Standard {
        Standard::new("customers_strict")
            .with_overall_minimum(99.0)
            .with_field("email", FieldRequirement::default().required())
    }

    #[test]
    fn test_block_is_default() -> anyhow::Result<()> {
        let guard = DataGuard::new(strict_standard(), AssessmentConfig::default())?;
        let verdict = guard.check_dataset("customers", customers())?;

        assert!(!verdict.evaluation.compliant);
        assert_eq!(verdict.decision, GuardDecision::Block);
        assert!(!verdict.allowed);
        Ok(())
    }

    #[test]
    fn test_warn_and_continue_let_data_through() -> anyhow::Result<()> {
        let warn = DataGuard::new(strict_standard(), AssessmentConfig::default())?
            .on_failure(OnFailure::Warn);
        let verdict = warn.check_dataset("customers", customers())?;
        assert_eq!(verdict.decision, GuardDecision::AllowWithWarnings);
        assert!(verdict.allowed);

        let cont = DataGuard::new(strict_standard(), AssessmentConfig::default())?
            .on_failure(OnFailure::Continue);
        let verdict = cont.check_dataset("customers", customers())?;
        assert_eq!(verdict.decision, GuardDecision::Allow);
        Ok(())
    }

    #[test]
    fn test_compliant_data_is_allowed() -> anyhow::Result<()> {
        let lenient = Standard::new("lenient")
            .with_overall_minimum(10.0)
            .with_dimension_minimum(Dimension::Completeness, 15.0);
        let guard = DataGuard::new(lenient, AssessmentConfig::default())?;
        let verdict = guard.check_dataset("customers", customers())?;

        assert!(verdict.evaluation.compliant);
        assert_eq!(verdict.decision, GuardDecision::Allow);
        assert_eq!(verdict.report.standard_id(), Some("lenient"));
        Ok(())
    }
}
