// adri-core/src/domain/dimensions/completeness.rs

use std::collections::BTreeMap;

use crate::domain::dimensions::{
    AssessmentContext, Dimension, DimensionAssessor, DimensionResult, MAX_DIMENSION_SCORE,
};
use crate::domain::scoring::{CategoryCount, ExplainPayload, WarningLog};

const NON_NULL: &str = "non_null";

/// Share of present cells over required fields (or every column when none is required).
#[derive(Debug, Default)]
pub struct CompletenessAssessor;

impl DimensionAssessor for CompletenessAssessor {
    fn dimension(&self) -> Dimension {
        Dimension::Completeness
    }

    fn assess(&self, ctx: &AssessmentContext<'_>) -> DimensionResult {
        let mut log = WarningLog::new();

        // Explicit metadata wins over inference
        if let Some(explicit) = ctx.connector.get_completeness_results()
            && explicit.has_explicit_completeness_info
            && let Some(percent) = explicit.overall_completeness_percent
        {
            let bounded = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
            if bounded != percent {
                log.push(format!(
                    "overall_completeness_percent {} clamped to {}",
                    percent, bounded
                ));
            }
            let mut findings = vec![format!("source reports {:.1}% completeness", bounded)];
            findings.extend(
                explicit
                    .missing_required_fields
                    .iter()
                    .map(|f| format!("source reports required field '{}' as missing", f)),
            );
            return DimensionResult::new(
                Dimension::Completeness,
                bounded / 100.0 * MAX_DIMENSION_SCORE,
            )
            .with_findings(findings)
            .with_warnings(log.into_vec());
        }

        let dataset = ctx.dataset;
        let recommendation =
            "Provide explicit completeness metadata from the source to confirm these figures"
                .to_string();

        if dataset.is_empty() {
            return DimensionResult::new(Dimension::Completeness, 0.0)
                .with_findings(vec![
                    "dataset has no rows; every value is missing".to_string(),
                ])
                .with_recommendations(vec![recommendation])
                .with_warnings(log.into_vec());
        }

        let required = ctx.requirements.required_fields();
        let targets: Vec<&str> = if required.is_empty() {
            dataset.column_names()
        } else {
            required
        };

        let rows = dataset.row_count() as u64;
        let empty_is_missing = ctx.config.completeness.treat_empty_strings_as_missing;
        let mut total = CategoryCount::default();
        let mut per_field: BTreeMap<String, BTreeMap<String, CategoryCount>> = BTreeMap::new();
        let mut findings = Vec::new();

        for field in targets {
            let count = match dataset.column(field) {
                Some(column) => {
                    let missing = column.missing_count(empty_is_missing) as u64;
                    if missing > 0 {
                        findings.push(format!(
                            "field '{}' has {} of {} values missing (null or empty)",
                            field, missing, rows
                        ));
                    }
                    CategoryCount::new(rows, rows - missing)
                }
                None => {
                    findings.push(format!(
                        "required field '{}' is missing from the dataset",
                        field
                    ));
                    CategoryCount::new(rows, 0)
                }
            };
            total.merge(count);
            per_field.insert(field.to_string(), BTreeMap::from([(NON_NULL.to_string(), count)]));
        }

        let ratio = total.pass_ratio().unwrap_or(1.0);
        let mut explain = ExplainPayload::default()
            .with_count(NON_NULL, total)
            .with_global_weights(BTreeMap::from([(NON_NULL.to_string(), 1.0)]));
        explain.per_field_counts = per_field;

        DimensionResult::new(Dimension::Completeness, ratio * MAX_DIMENSION_SCORE)
            .with_findings(findings)
            .with_recommendations(vec![recommendation])
            .with_explain(explain)
            .with_warnings(log.into_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::configuration::AssessmentConfig;
    use crate::domain::dataset::{Dataset, Value};
    use crate::domain::dimensions::testing::run;
    use crate::domain::standard::RequirementSet;
    use crate::infrastructure::adapters::InMemoryConnector;
    use crate::ports::connector::CompletenessResults;
    use anyhow::Result;

    fn orders() -> Result<InMemoryConnector> {
        let dataset = Dataset::builder()
            .column("order_id", vec![1_i64, 2, 3, 4])
            .column("status", vec![Value::from("paid"), Value::Null, Value::from(""), Value::from("paid")])
            .build()?;
        Ok(InMemoryConnector::new("orders", dataset))
    }

    fn assess(connector: &InMemoryConnector) -> Result<DimensionResult> {
        run(
            &CompletenessAssessor,
            connector,
            &AssessmentConfig::default(),
            &RequirementSet::default(),
        )
    }

    #[test]
    fn test_explicit_percent_wins_over_inference() -> Result<()> {
        let connector = orders()?.with_completeness(CompletenessResults {
            has_explicit_completeness_info: true,
            overall_completeness_percent: Some(75.0),
            missing_required_fields: vec!["customer_email".to_string()],
        });

        let result = assess(&connector)?;

        assert_eq!(result.score, 15.0);
        assert!(result.findings.iter().any(|f| f.contains("75.0%")));
        assert!(result.findings.iter().any(|f| f.contains("'customer_email'")));
        assert!(result.explain.is_none());
        Ok(())
    }

    #[test]
    fn test_explicit_percent_above_hundred_is_clamped() -> Result<()> {
        let connector = orders()?.with_completeness(CompletenessResults {
            has_explicit_completeness_info: true,
            overall_completeness_percent: Some(140.0),
            ..Default::default()
        });

        let result = assess(&connector)?;

        assert_eq!(result.score, 20.0);
        assert!(result.warnings.iter().any(|w| w.contains("140 clamped to 100")));
        Ok(())
    }

    #[test]
    fn test_inferred_ratio_counts_null_and_empty() -> Result<()> {
        let result = assess(&orders()?)?;

        // 6 of 8 cells present
        assert_eq!(result.score, 15.0);
        assert!(result.findings[0].contains("'status' has 2 of 4 values missing"));
        let explain = result.explain.unwrap();
        assert_eq!(explain.rule_counts[NON_NULL], CategoryCount::new(8, 6));
        Ok(())
    }
}
