// adri-core/src/domain/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

use crate::ADRI_VERSION;
use crate::domain::configuration::ReadinessBands;
use crate::domain::dataset::Dataset;
use crate::domain::dimensions::{Dimension, DimensionResult, MAX_DIMENSION_SCORE, clamp_score};
use crate::domain::scoring::{CategoryCount, ExplainPayload, WarningLog};
use crate::domain::standard::RequirementSet;

/// Human-facing band of the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessLevel {
    Ready,
    Moderate,
    Poor,
}

impl ReadinessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Moderate => "moderate",
            Self::Poor => "poor",
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-field summary across dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldAnalysis {
    pub present: bool,
    pub null_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity_pass_ratio: Option<f64>,
}

/// Summarizes every column plus every field named by a requirement.
pub fn analyze_fields(
    dataset: &Dataset,
    requirements: &RequirementSet,
    validity: Option<&DimensionResult>,
) -> BTreeMap<String, FieldAnalysis> {
    let mut names: Vec<String> = dataset.column_names().into_iter().map(String::from).collect();
    names.extend(requirements.iter().map(|(name, _)| name.clone()));

    names
        .into_iter()
        .map(|name| {
            let column = dataset.column(&name);
            let ratio = validity
                .and_then(|v| v.explain.as_ref())
                .and_then(|e| e.per_field_counts.get(&name))
                .and_then(|counts| {
                    let mut total = CategoryCount::default();
                    counts.values().for_each(|c| total.merge(*c));
                    total.pass_ratio()
                });
            let analysis = FieldAnalysis {
                present: column.is_some(),
                null_count: column.map_or(0, |c| c.missing_count(false) as u64),
                validity_pass_ratio: ratio,
            };
            (name, analysis)
        })
        .collect()
}

/// Immutable result of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    source_name: String,
    source_type: String,
    overall_score: f64,
    readiness_level: ReadinessLevel,
    dimension_results: BTreeMap<Dimension, DimensionResult>,
    summary_findings: Vec<String>,
    summary_recommendations: Vec<String>,
    warnings: Vec<String>,
    field_analysis: BTreeMap<String, FieldAnalysis>,
    metadata: BTreeMap<String, JsonValue>,
    standard_id: Option<String>,
    assessed_at: DateTime<Utc>,
}

impl AssessmentReport {
    pub fn builder(source_name: impl Into<String>, source_type: impl Into<String>) -> ReportBuilder {
        ReportBuilder {
            source_name: source_name.into(),
            source_type: source_type.into(),
            dimension_results: BTreeMap::new(),
            warnings: Vec::new(),
            field_analysis: BTreeMap::new(),
            metadata: BTreeMap::new(),
            standard_id: None,
            assessed_at: Utc::now(),
            bands: ReadinessBands::default(),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn readiness_level(&self) -> ReadinessLevel {
        self.readiness_level
    }

    pub fn dimension_results(&self) -> &BTreeMap<Dimension, DimensionResult> {
        &self.dimension_results
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionResult> {
        self.dimension_results.get(&dimension)
    }

    pub fn dimension_score(&self, dimension: Dimension) -> f64 {
        self.dimension(dimension).map_or(0.0, |r| r.score)
    }

    pub fn summary_findings(&self) -> &[String] {
        &self.summary_findings
    }

    pub fn summary_recommendations(&self) -> &[String] {
        &self.summary_recommendations
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn field_analysis(&self) -> &BTreeMap<String, FieldAnalysis> {
        &self.field_analysis
    }

    pub fn metadata(&self) -> &BTreeMap<String, JsonValue> {
        &self.metadata
    }

    pub fn standard_id(&self) -> Option<&str> {
        self.standard_id.as_deref()
    }

    pub fn assessed_at(&self) -> DateTime<Utc> {
        self.assessed_at
    }

    pub fn explain(&self, dimension: Dimension) -> Option<&ExplainPayload> {
        self.dimension(dimension).and_then(|r| r.explain.as_ref())
    }

    /// Stable export envelope. Key names and nesting only change with a version bump.
    pub fn to_export(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(ExportEnvelope::from(self))
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&ExportEnvelope::from(self))
    }
}

pub struct ReportBuilder {
    source_name: String,
    source_type: String,
    dimension_results: BTreeMap<Dimension, DimensionResult>,
    warnings: Vec<String>,
    field_analysis: BTreeMap<String, FieldAnalysis>,
    metadata: BTreeMap<String, JsonValue>,
    standard_id: Option<String>,
    assessed_at: DateTime<Utc>,
    bands: ReadinessBands,
}

impl ReportBuilder {
    /// Scores outside [0, 20] are clamped again here, with a warning, so the
    /// overall score stays within [0, 100] whatever the result's origin.
    pub fn dimension(mut self, mut result: DimensionResult) -> Self {
        let bounded = clamp_score(result.score);
        if bounded != result.score {
            result
                .warnings
                .push(format!("score {} out of range; clamped to {}", result.score, bounded));
            result.score = bounded;
        }
        self.dimension_results.insert(result.dimension, result);
        self
    }

    /// Convenience for callers building reports with chosen scores.
    pub fn score(self, dimension: Dimension, score: f64) -> Self {
        self.dimension(DimensionResult::new(dimension, score))
    }

    pub fn warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn field_analysis(mut self, analysis: BTreeMap<String, FieldAnalysis>) -> Self {
        self.field_analysis = analysis;
        self
    }

    pub fn metadata(mut self, metadata: BTreeMap<String, JsonValue>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn standard_id(mut self, id: impl Into<String>) -> Self {
        self.standard_id = Some(id.into());
        self
    }

    pub fn assessed_at(mut self, at: DateTime<Utc>) -> Self {
        self.assessed_at = at;
        self
    }

    pub fn readiness_bands(mut self, bands: ReadinessBands) -> Self {
        self.bands = bands;
        self
    }

    /// Overall score is the plain sum of the five dimension scores, in fixed order.
    /// A dimension that was not assessed scores 0 with a finding.
    pub fn build(mut self) -> AssessmentReport {
        let mut log = WarningLog::new();
        let bands = self.bands.resolved(&mut log);

        let mut overall_score = 0.0;
        let mut summary_findings = Vec::new();
        let mut summary_recommendations = Vec::new();
        let mut warnings = Vec::new();

        for dimension in Dimension::ALL {
            let result = self.dimension_results.entry(dimension).or_insert_with(|| {
                DimensionResult::new(dimension, 0.0)
                    .with_findings(vec![format!("{} was not assessed", dimension)])
            });
            overall_score += result.score;
            summary_findings.extend(result.findings.iter().map(|f| format!("[{}] {}", dimension, f)));
            summary_recommendations.extend(
                result
                    .recommendations
                    .iter()
                    .map(|r| format!("[{}] {}", dimension, r)),
            );
            warnings.extend(result.warnings.iter().map(|w| format!("{}: {}", dimension, w)));
        }
        warnings.extend(self.warnings);
        warnings.extend(log.into_vec());

        AssessmentReport {
            source_name: self.source_name,
            source_type: self.source_type,
            overall_score,
            readiness_level: bands.classify(overall_score),
            dimension_results: self.dimension_results,
            summary_findings,
            summary_recommendations,
            warnings,
            field_analysis: self.field_analysis,
            metadata: self.metadata,
            standard_id: self.standard_id,
            assessed_at: self.assessed_at,
        }
    }
}

// --- Export shape ---------------------------------------------------------

#[derive(Serialize)]
struct ExportEnvelope<'a> {
    adri_assessment_report: ExportBody<'a>,
}

#[derive(Serialize)]
struct ExportBody<'a> {
    adri_version: &'static str,
    metadata: ExportMetadata<'a>,
    summary: ExportSummary<'a>,
    dimensions: BTreeMap<&'static str, ExportDimension<'a>>,
    field_analysis: &'a BTreeMap<String, FieldAnalysis>,
}

#[derive(Serialize)]
struct ExportMetadata<'a> {
    source_name: &'a str,
    source_type: &'a str,
    assessed_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    standard_id: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    source_metadata: &'a BTreeMap<String, JsonValue>,
}

#[derive(Serialize)]
struct ExportSummary<'a> {
    overall_score: f64,
    readiness_level: ReadinessLevel,
    dimension_scores: BTreeMap<&'static str, f64>,
    findings: &'a [String],
    recommendations: &'a [String],
    warnings: &'a [String],
}

#[derive(Serialize)]
struct ExportDimension<'a> {
    score: f64,
    max_score: f64,
    findings: &'a [String],
    recommendations: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    explain: Option<&'a ExplainPayload>,
}

impl<'a> From<&'a AssessmentReport> for ExportEnvelope<'a> {
    fn from(report: &'a AssessmentReport) -> Self {
        let dimensions = report
            .dimension_results
            .iter()
            .map(|(dimension, result)| {
                (
                    dimension.as_str(),
                    ExportDimension {
                        score: result.score,
                        max_score: MAX_DIMENSION_SCORE,
                        findings: &result.findings,
                        recommendations: &result.recommendations,
                        explain: result.explain.as_ref(),
                    },
                )
            })
            .collect();
        let dimension_scores = report
            .dimension_results
            .iter()
            .map(|(dimension, result)| (dimension.as_str(), result.score))
            .collect();

        ExportEnvelope {
            adri_assessment_report: ExportBody {
                adri_version: ADRI_VERSION,
                metadata: ExportMetadata {
                    source_name: &report.source_name,
                    source_type: &report.source_type,
                    assessed_at: report.assessed_at.to_rfc3339(),
                    standard_id: report.standard_id.as_deref(),
                    source_metadata: &report.metadata,
                },
                summary: ExportSummary {
                    overall_score: report.overall_score,
                    readiness_level: report.readiness_level,
                    dimension_scores,
                    findings: &report.summary_findings,
                    recommendations: &report.summary_recommendations,
                    warnings: &report.warnings,
                },
                dimensions,
                field_analysis: &report.field_analysis,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn report(scores: [f64; 5]) -> AssessmentReport {
        Dimension::ALL
            .into_iter()
            .zip(scores)
            .fold(AssessmentReport::builder("orders.csv", "csv"), |b, (d, s)| {
                b.score(d, s)
            })
            .build()
    }

    #[test]
    fn test_overall_is_sum_of_dimensions() {
        let r = report([18.5, 14.0, 20.0, 10.25, 7.0]);
        assert_eq!(r.overall_score(), 18.5 + 14.0 + 20.0 + 10.25 + 7.0);
        assert_eq!(r.readiness_level(), ReadinessLevel::Moderate);
    }

    #[test]
    fn test_missing_dimension_scores_zero() {
        let r = AssessmentReport::builder("x", "memory")
            .score(Dimension::Validity, 20.0)
            .build();
        assert_eq!(r.dimension_results().len(), 5);
        assert_eq!(r.overall_score(), 20.0);
        assert_eq!(r.readiness_level(), ReadinessLevel::Poor);
        assert!(r.summary_findings().iter().any(|f| f.contains("freshness was not assessed")));
    }

    #[test]
    fn test_custom_bands() {
        let r = AssessmentReport::builder("x", "memory")
            .readiness_bands(ReadinessBands {
                ready_minimum: 60.0,
                moderate_minimum: 20.0,
            })
            .score(Dimension::Validity, 20.0)
            .score(Dimension::Completeness, 20.0)
            .score(Dimension::Freshness, 20.0)
            .build();
        assert_eq!(r.readiness_level(), ReadinessLevel::Ready);
    }

    #[test]
    fn test_export_envelope_shape() -> Result<()> {
        let r = report([20.0, 20.0, 20.0, 20.0, 20.0]);
        let export = r.to_export()?;
        let body = &export["adri_assessment_report"];
        assert_eq!(body["adri_version"], ADRI_VERSION);
        assert_eq!(body["summary"]["overall_score"], 100.0);
        assert_eq!(body["summary"]["readiness_level"], "ready");
        assert_eq!(body["dimensions"]["validity"]["max_score"], 20.0);
        assert_eq!(body["metadata"]["source_name"], "orders.csv");
        assert!(body["dimensions"]["validity"].get("explain").is_none());
        Ok(())
    }

    #[test]
    fn test_out_of_range_result_is_clamped_on_insert() {
        let mut inflated = DimensionResult::new(Dimension::Validity, 20.0);
        inflated.score = 95.0;
        let r = AssessmentReport::builder("x", "memory")
            .dimension(inflated)
            .score(Dimension::Completeness, 20.0)
            .build();

        assert_eq!(r.dimension_score(Dimension::Validity), 20.0);
        assert_eq!(r.overall_score(), 40.0);
        assert!(r.warnings().iter().any(|w| w.starts_with("validity: score 95")));
    }
}
