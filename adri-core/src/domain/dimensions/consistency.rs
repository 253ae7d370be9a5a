// adri-core/src/domain/dimensions/consistency.rs

use std::collections::HashSet;

use crate::domain::dataset::Dataset;
use crate::domain::dimensions::{
    AssessmentContext, Dimension, DimensionAssessor, DimensionResult, MAX_DIMENSION_SCORE,
    run_rules,
};
use crate::domain::rules::Rule;
use crate::domain::rules::builtin::{PrimaryKeyRule, TypeHomogeneityRule};
use crate::domain::scoring::{AdditiveContribution, ExplainPayload, WarningLog, combine};

/// Weighted pass ratio over key uniqueness, type homogeneity and configured
/// consistency rules.
#[derive(Debug, Default)]
pub struct ConsistencyAssessor;

impl DimensionAssessor for ConsistencyAssessor {
    fn dimension(&self) -> Dimension {
        Dimension::Consistency
    }

    fn assess(&self, ctx: &AssessmentContext<'_>) -> DimensionResult {
        let mut log = WarningLog::new();
        let dataset = ctx.dataset;

        if dataset.is_empty() {
            return DimensionResult::new(Dimension::Consistency, MAX_DIMENSION_SCORE)
                .with_findings(vec![
                    "dataset has no rows; consistency checks were skipped".to_string(),
                ])
                .with_warnings(log.into_vec());
        }

        let key_fields: &[String] = if ctx.config.consistency.primary_key_fields.is_empty() {
            ctx.primary_key_fields
        } else {
            &ctx.config.consistency.primary_key_fields
        };

        let mut builtins: Vec<Box<dyn Rule>> = Vec::new();
        let mut findings = Vec::new();
        let mut recommendations = Vec::new();
        if key_fields.is_empty() {
            let duplicates = duplicate_rows(dataset);
            if duplicates > 0 {
                findings.push(format!(
                    "{} fully duplicated row(s) found (no primary key declared)",
                    duplicates
                ));
            }
            recommendations.push(
                "Declare primary_key_fields so key uniqueness can be verified".to_string(),
            );
        } else {
            builtins.push(Box::new(PrimaryKeyRule::new(key_fields.to_vec())));
        }
        builtins.push(Box::new(TypeHomogeneityRule::all_columns()));

        let rules = builtins
            .iter()
            .map(|r| r.as_ref())
            .chain(ctx.rules_for(Dimension::Consistency));
        let run = run_rules(rules, dataset, &ctx.config.consistency.rule_weights);
        findings.extend(run.findings);

        let components: Vec<_> = run.components.iter().map(|(c, _)| c.clone()).collect();
        let weighted = combine(&components, AdditiveContribution::default(), &mut log);

        let mut explain = ExplainPayload::default().with_global_weights(weighted.applied_map());
        for (component, count) in &run.components {
            explain = explain.with_count(component.key.clone(), *count);
        }

        let score = match weighted.ratio {
            Some(ratio) => ratio * MAX_DIMENSION_SCORE,
            None => {
                findings.push("no consistency check applied to this dataset".to_string());
                MAX_DIMENSION_SCORE
            }
        };

        DimensionResult::new(Dimension::Consistency, score)
            .with_findings(findings)
            .with_recommendations(recommendations)
            .with_explain(explain)
            .with_warnings(log.into_vec())
    }
}

/// Rows whose every cell repeats an earlier row.
fn duplicate_rows(dataset: &Dataset) -> usize {
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    (0..dataset.row_count())
        .filter_map(|i| dataset.row(i))
        .filter(|row| {
            let key: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            !seen.insert(key)
        })
        .count()
}
