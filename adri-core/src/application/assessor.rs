// adri-core/src/application/assessor.rs

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::configuration::AssessmentConfig;
use crate::domain::dimensions::{
    AssessmentContext, CompletenessAssessor, ConsistencyAssessor, Dimension, DimensionAssessor,
    FreshnessAssessor, PlausibilityAssessor, ValidityAssessor,
};
use crate::domain::report::{AssessmentReport, analyze_fields};
use crate::domain::rules::{Rule, RuleRegistry};
use crate::domain::standard::{RequirementSet, Standard};
use crate::error::AdriError;
use crate::ports::connector::DataConnector;

/// Composition root: one connector in, one report out.
///
/// Holds no per-call state, so one `Assessor` can serve concurrent assessments.
pub struct Assessor {
    config: AssessmentConfig,
    standard: Option<Standard>,
    requirements: RequirementSet,
    registry: Arc<RuleRegistry>,
    as_of: Option<DateTime<Utc>>,
    assessors: Vec<Box<dyn DimensionAssessor>>,
}

impl Default for Assessor {
    fn default() -> Self {
        Self::new(AssessmentConfig::default())
    }
}

impl Assessor {
    pub fn new(config: AssessmentConfig) -> Self {
        Self {
            config,
            standard: None,
            requirements: RequirementSet::default(),
            registry: RuleRegistry::global(),
            as_of: None,
            assessors: vec![
                Box::new(ValidityAssessor),
                Box::new(CompletenessAssessor),
                Box::new(FreshnessAssessor),
                Box::new(ConsistencyAssessor),
                Box::new(PlausibilityAssessor),
            ],
        }
    }

    /// Attaches a standard; its field requirements drive validity and completeness.
    pub fn with_standard(mut self, standard: Standard) -> Result<Self, AdriError> {
        self.requirements = standard.check()?;
        self.standard = Some(standard);
        Ok(self)
    }

    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Fixes the instant freshness is measured against (defaults to now).
    pub fn as_of(mut self, instant: DateTime<Utc>) -> Self {
        self.as_of = Some(instant);
        self
    }

    /// Replaces the assessor of the same dimension.
    pub fn with_dimension_assessor(mut self, assessor: Box<dyn DimensionAssessor>) -> Self {
        let dimension = assessor.dimension();
        self.assessors.retain(|a| a.dimension() != dimension);
        self.assessors.push(assessor);
        self
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    pub fn standard(&self) -> Option<&Standard> {
        self.standard.as_ref()
    }

    /// Runs the five dimensions in fixed order and sums their scores.
    /// Only a connector failure aborts; everything else degrades into findings and warnings.
    #[instrument(skip_all, fields(source = %connector.get_name()))]
    pub fn assess(&self, connector: &dyn DataConnector) -> Result<AssessmentReport, AdriError> {
        // 1. DATA (the single fatal failure mode)
        let dataset = connector.get_data().map_err(|e| match e {
            AdriError::DataUnavailable { .. } => e,
            other => AdriError::data_unavailable(connector.get_name(), other),
        })?;
        debug!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Dataset loaded"
        );

        // 2. RULES (configured instantiations; bad specs are skipped with a warning)
        let mut warnings = Vec::new();
        let mut rules: Vec<Box<dyn Rule>> = Vec::new();
        for spec in &self.config.rules {
            match self.registry.instantiate(spec) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    warn!(rule = %spec.id, error = %e, "Skipping configured rule");
                    warnings.push(format!("rule '{}' skipped: {}", spec.id, e));
                }
            }
        }

        // 3. DIMENSIONS
        let primary_key_fields: &[String] = self
            .standard
            .as_ref()
            .map_or(&[], |s| s.requirements.primary_key_fields.as_slice());
        let as_of = self.as_of.unwrap_or_else(Utc::now);
        let ctx = AssessmentContext {
            dataset: &dataset,
            connector,
            requirements: &self.requirements,
            primary_key_fields,
            config: &self.config,
            rules: &rules,
            as_of,
        };

        let mut builder = AssessmentReport::builder(connector.get_name(), connector.get_type())
            .metadata(connector.get_metadata())
            .readiness_bands(self.config.readiness)
            .assessed_at(as_of);
        if let Some(standard) = &self.standard {
            builder = builder.standard_id(standard.id());
        }

        let mut validity = None;
        for dimension in Dimension::ALL {
            let Some(assessor) = self.assessors.iter().find(|a| a.dimension() == dimension) else {
                continue;
            };
            let mut result = assessor.assess(&ctx);
            // Keyed by the slot it was run for, whatever the result claims
            result.dimension = dimension;
            debug!(dimension = %dimension, score = result.score, "Dimension assessed");
            if dimension == Dimension::Validity {
                validity = Some(result.clone());
            }
            builder = builder.dimension(result);
        }

        // 4. REPORT
        builder = builder.field_analysis(analyze_fields(
            &dataset,
            &self.requirements,
            validity.as_ref(),
        ));
        for warning in warnings {
            builder = builder.warning(warning);
        }
        let report = builder.build();

        info!(
            overall = report.overall_score(),
            readiness = %report.readiness_level(),
            "Assessment complete"
        );
        Ok(report)
    }
}
