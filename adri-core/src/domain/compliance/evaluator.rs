// adri-core/src/domain/compliance/evaluator.rs

use serde::Serialize;

use crate::domain::dimensions::MAX_DIMENSION_SCORE;
use crate::domain::report::AssessmentReport;
use crate::domain::standard::Standard;

pub const OVERALL_REQUIREMENT: &str = "overall_score";

/// One unmet threshold. `gap = max(0, expected - actual)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceGap {
    pub requirement: String,
    pub expected: f64,
    pub actual: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldGap {
    pub field: String,
    pub reason: String,
}

/// Verdict of a report against a standard. A failed standard is data, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateEvaluation {
    pub standard_id: String,
    pub compliant: bool,
    /// Weighted percentage of satisfied thresholds.
    pub compliance_score: f64,
    pub gaps: Vec<ComplianceGap>,
    pub field_gaps: Vec<FieldGap>,
    pub certification_eligible: bool,
}

impl TemplateEvaluation {
    pub fn gap(&self, requirement: &str) -> Option<&ComplianceGap> {
        self.gaps.iter().find(|g| g.requirement == requirement)
    }
}

struct Threshold {
    name: String,
    expected: f64,
    actual: f64,
    weight: f64,
    /// Points per percent of certification margin.
    margin_scale: f64,
}

impl Threshold {
    fn shortfall(&self, margin: f64) -> f64 {
        (self.expected + margin * self.margin_scale - self.actual).max(0.0)
    }
}

pub struct TemplateEvaluator;

impl TemplateEvaluator {
    /// Pure comparison of report scores against the standard's thresholds.
    pub fn evaluate(report: &AssessmentReport, standard: &Standard) -> TemplateEvaluation {
        let requirements = &standard.requirements;

        // 1. Collect thresholds: overall first, then dimensions in fixed order
        let mut thresholds = Vec::new();
        if let Some(minimum) = requirements.overall_minimum {
            thresholds.push(Threshold {
                name: OVERALL_REQUIREMENT.to_string(),
                expected: minimum,
                actual: report.overall_score(),
                weight: 1.0,
                margin_scale: 1.0,
            });
        }
        for (dimension, requirement) in &requirements.dimension_requirements {
            thresholds.push(Threshold {
                name: dimension.as_str().to_string(),
                expected: requirement.minimum_score,
                actual: report.dimension_score(*dimension),
                weight: requirement.weight.max(0.0),
                margin_scale: MAX_DIMENSION_SCORE / 100.0,
            });
        }

        // 2. Gaps
        let gaps: Vec<ComplianceGap> = thresholds
            .iter()
            .filter_map(|t| {
                let gap = t.shortfall(0.0);
                (gap > 0.0).then(|| ComplianceGap {
                    requirement: t.name.clone(),
                    expected: t.expected,
                    actual: t.actual,
                    gap,
                })
            })
            .collect();
        let compliant = gaps.is_empty();

        // 3. Weighted share of satisfied thresholds
        let compliance_score = weighted_share(&thresholds);

        // 4. Field presence
        let field_gaps: Vec<FieldGap> = requirements
            .field_requirements
            .iter()
            .filter(|(_, r)| !r.nullable)
            .filter(|(name, _)| {
                report
                    .field_analysis()
                    .get(name.as_str())
                    .is_none_or(|a| !a.present)
            })
            .map(|(name, _)| FieldGap {
                field: name.clone(),
                reason: "required field absent from the dataset".to_string(),
            })
            .collect();

        // 5. Certification: same thresholds raised by the margin
        let certification_eligible = match &standard.certification {
            None => compliant,
            Some(policy) => {
                compliant
                    && thresholds.iter().all(|t| t.shortfall(policy.margin) == 0.0)
                    && (!policy.require_all_fields || field_gaps.is_empty())
            }
        };

        TemplateEvaluation {
            standard_id: standard.id().to_string(),
            compliant,
            compliance_score,
            gaps,
            field_gaps,
            certification_eligible,
        }
    }
}

fn weighted_share(thresholds: &[Threshold]) -> f64 {
    if thresholds.is_empty() {
        return 100.0;
    }
    let total: f64 = thresholds.iter().map(|t| t.weight).sum();
    let met = |t: &&Threshold| t.shortfall(0.0) == 0.0;
    if total <= 0.0 {
        let satisfied = thresholds.iter().filter(met).count();
        return satisfied as f64 / thresholds.len() as f64 * 100.0;
    }
    let satisfied: f64 = thresholds.iter().filter(met).map(|t| t.weight).sum();
    satisfied / total * 100.0
}
