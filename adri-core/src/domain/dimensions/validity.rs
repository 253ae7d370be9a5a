// adri-core/src/domain/dimensions/validity.rs

use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::configuration::resolve_credit;
use crate::domain::dimensions::{
    AssessmentContext, Dimension, DimensionAssessor, DimensionResult, MAX_DIMENSION_SCORE,
    apply_credit, run_rules,
};
use crate::domain::rules::Rule;
use crate::domain::rules::builtin::TypeHomogeneityRule;
use crate::domain::rules::builtin::consistency::TYPE_HOMOGENEITY_RULE;
use crate::domain::scoring::{ExplainPayload, RuleCountTable, WarningLog, score_categories};

/// Scores values against the standard's field requirements through the weighting engine.
#[derive(Debug, Default)]
pub struct ValidityAssessor;

impl DimensionAssessor for ValidityAssessor {
    fn dimension(&self) -> Dimension {
        Dimension::Validity
    }

    fn assess(&self, ctx: &AssessmentContext<'_>) -> DimensionResult {
        let mut log = WarningLog::new();
        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        let dataset = ctx.dataset;

        // 1. Count phase
        let table = RuleCountTable::build(dataset, ctx.requirements);
        for field in &table.missing_fields {
            let required = ctx
                .requirements
                .get(field)
                .is_some_and(|r| !r.requirement.nullable);
            if required {
                findings.push(format!("required field '{}' is missing from the dataset", field));
            } else {
                findings.push(format!(
                    "field '{}' has a requirement but is missing from the dataset",
                    field
                ));
            }
        }
        for (field, counts) in &table.per_field_counts {
            for (category, count) in counts {
                if count.failed() > 0 {
                    findings.push(format!(
                        "'{}': {} of {} values failed {}",
                        field,
                        count.failed(),
                        count.total,
                        category
                    ));
                }
            }
        }

        // 2. Configured validity rules join the weighted sum
        let run = run_rules(ctx.rules_for(Dimension::Validity), dataset, &BTreeMap::new());
        findings.extend(run.findings);
        let has_rules = !run.components.is_empty();

        if ctx.requirements.is_empty() && !has_rules {
            return infer_without_requirements(ctx, findings, log);
        }

        // 3-5. Weight resolution, composition and explain assembly
        let outcome = score_categories(
            &table,
            ctx.requirements,
            &ctx.config.validity.rule_weights,
            &ctx.config.validity.field_overrides,
            run.components,
            &mut log,
        );

        let score = match outcome.ratio {
            Some(ratio) => ratio * MAX_DIMENSION_SCORE,
            None => {
                if dataset.is_empty() {
                    findings.push("dataset has no rows; no values to validate".to_string());
                } else {
                    findings.push(
                        "no validity check applied: constrained fields are missing or null"
                            .to_string(),
                    );
                }
                MAX_DIMENSION_SCORE
            }
        };
        if !table.missing_fields.is_empty() {
            recommendations.push(
                "Add the missing fields to the dataset or relax the standard's requirements"
                    .to_string(),
            );
        }
        debug!(score, "Validity scored");

        DimensionResult::new(Dimension::Validity, score)
            .with_findings(findings)
            .with_recommendations(recommendations)
            .with_explain(outcome.explain)
            .with_warnings(log.into_vec())
    }
}

/// No requirements: type consistency of the raw columns, at implicit credit.
fn infer_without_requirements(
    ctx: &AssessmentContext<'_>,
    mut findings: Vec<String>,
    mut log: WarningLog,
) -> DimensionResult {
    let credit = resolve_credit(
        ctx.config.validity.implicit_credit,
        "validity.implicit_credit",
        &mut log,
    );
    let inferred = TypeHomogeneityRule::all_columns().evaluate(ctx.dataset);

    let score = if inferred.is_applicable() {
        findings.extend(inferred.findings.iter().cloned());
        findings.push("validity inferred from column type consistency".to_string());
        apply_credit(inferred.pass_ratio() * MAX_DIMENSION_SCORE, credit)
    } else {
        findings.push("dataset has no values to validate".to_string());
        apply_credit(MAX_DIMENSION_SCORE, credit)
    };

    DimensionResult::new(Dimension::Validity, score)
        .with_findings(findings)
        .with_recommendations(vec![
            "Supply field requirements in a standard to enable full validity scoring".to_string(),
        ])
        .with_explain(ExplainPayload::default().with_count(TYPE_HOMOGENEITY_RULE, inferred.counts()))
        .with_warnings(log.into_vec())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::configuration::AssessmentConfig;
    use crate::domain::dataset::{Dataset, Value};
    use crate::domain::dimensions::testing::run;
    use crate::domain::standard::{FieldRequirement, RequirementSet};
    use crate::infrastructure::adapters::InMemoryConnector;
    use anyhow::Result;

    fn mixed() -> Result<InMemoryConnector> {
        let dataset = Dataset::builder()
            .column("n", vec![Value::Integer(1), Value::Integer(2), Value::from("three")])
            .column("s", vec!["a", "b", "c"])
            .build()?;
        Ok(InMemoryConnector::new("mixed", dataset))
    }

    #[test]
    fn test_without_requirements_scores_inferred_types_at_credit() -> Result<()> {
        let result = run(
            &ValidityAssessor,
            &mixed()?,
            &AssessmentConfig::default(),
            &RequirementSet::default(),
        )?;

        // floor(5/6 * 20 * 0.7)
        assert_eq!(result.score, 11.0);
        assert!(result.findings.iter().any(|f| f.contains("column type consistency")));
        assert!(result.recommendations[0].contains("field requirements"));
        assert!(result.explain.unwrap().rule_counts.contains_key(TYPE_HOMOGENEITY_RULE));
        Ok(())
    }

    #[test]
    fn test_full_credit_keeps_inferred_ratio() -> Result<()> {
        let mut config = AssessmentConfig::default();
        config.validity.implicit_credit = 1.0;

        let result = run(&ValidityAssessor, &mixed()?, &config, &RequirementSet::default())?;

        assert!((result.score - 50.0 / 3.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_missing_required_field_is_reported() -> Result<()> {
        let mut fields = BTreeMap::new();
        fields.insert(
            "s".to_string(),
            FieldRequirement::default().with_allowed_values(vec!["a", "b", "c"]),
        );
        fields.insert("order_id".to_string(), FieldRequirement::default().required());
        let requirements = RequirementSet::compile(&fields)?;

        let result = run(&ValidityAssessor, &mixed()?, &AssessmentConfig::default(), &requirements)?;

        assert!(
            result
                .findings
                .iter()
                .any(|f| f == "required field 'order_id' is missing from the dataset")
        );
        Ok(())
    }
}
