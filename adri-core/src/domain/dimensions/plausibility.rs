// adri-core/src/domain/dimensions/plausibility.rs

use crate::domain::configuration::resolve_credit;
use crate::domain::dimensions::{
    AssessmentContext, Dimension, DimensionAssessor, DimensionResult, MAX_DIMENSION_SCORE,
    apply_credit, run_rules,
};
use crate::domain::rules::Rule;
use crate::domain::rules::builtin::{CategoricalFrequencyRule, OutlierRule};
use crate::domain::scoring::{
    AdditiveContribution, CategoryCount, ExplainPayload, WarningLog, WeightedComponent, combine,
};
use crate::ports::connector::PlausibilityResults;

/// Explicit rule results from the source when available, statistical profiling otherwise.
#[derive(Debug, Default)]
pub struct PlausibilityAssessor;

impl DimensionAssessor for PlausibilityAssessor {
    fn dimension(&self) -> Dimension {
        Dimension::Plausibility
    }

    fn assess(&self, ctx: &AssessmentContext<'_>) -> DimensionResult {
        let mut log = WarningLog::new();

        if let Some(explicit) = ctx.connector.get_plausibility_results()
            && explicit.has_explicit_plausibility_info
            && !explicit.rule_results.is_empty()
        {
            return assess_explicit(ctx, &explicit, log);
        }

        let dataset = ctx.dataset;
        let recommendations = vec![
            "Supply explicit plausibility rule results from the source to confirm these checks"
                .to_string(),
        ];
        if dataset.is_empty() {
            return DimensionResult::new(Dimension::Plausibility, MAX_DIMENSION_SCORE)
                .with_findings(vec![
                    "dataset has no rows; plausibility was not profiled".to_string(),
                ])
                .with_recommendations(recommendations)
                .with_warnings(log.into_vec());
        }

        let credit = resolve_credit(
            ctx.config.plausibility.implicit_credit,
            "plausibility.implicit_credit",
            &mut log,
        );
        let builtins: [Box<dyn Rule>; 2] = [
            Box::new(OutlierRule::default()),
            Box::new(CategoricalFrequencyRule::default()),
        ];
        let rules = builtins
            .iter()
            .map(|r| r.as_ref())
            .chain(ctx.rules_for(Dimension::Plausibility));
        let mut run = run_rules(rules, dataset, &ctx.config.plausibility.rule_weights);

        let components: Vec<WeightedComponent> =
            run.components.iter().map(|(c, _)| c.clone()).collect();
        let weighted = combine(&components, AdditiveContribution::default(), &mut log);

        let mut explain = ExplainPayload::default().with_global_weights(weighted.applied_map());
        for (component, count) in &run.components {
            explain = explain.with_count(component.key.clone(), *count);
        }

        let raw = match weighted.ratio {
            Some(ratio) => ratio * MAX_DIMENSION_SCORE,
            None => {
                run.findings
                    .push("no column suitable for plausibility profiling".to_string());
                MAX_DIMENSION_SCORE
            }
        };

        DimensionResult::new(Dimension::Plausibility, apply_credit(raw, credit))
            .with_findings(run.findings)
            .with_recommendations(recommendations)
            .with_explain(explain)
            .with_warnings(log.into_vec())
    }
}

fn assess_explicit(
    ctx: &AssessmentContext<'_>,
    explicit: &PlausibilityResults,
    mut log: WarningLog,
) -> DimensionResult {
    let mut findings = Vec::new();
    let mut components = Vec::new();
    let mut explain = ExplainPayload::default();

    for result in &explicit.rule_results {
        if result.total == 0 {
            findings.push(format!("rule '{}' reported no checks", result.rule_id));
            continue;
        }
        let count = CategoryCount::new(result.total, result.passed);
        if result.passed > result.total {
            log.push(format!(
                "rule '{}' reports passed {} > total {}; capped",
                result.rule_id, result.passed, result.total
            ));
        }
        if count.failed() > 0 {
            findings.push(format!(
                "rule '{}' failed {} of {} checks",
                result.rule_id,
                count.failed(),
                count.total
            ));
        }
        let weight = ctx
            .config
            .plausibility
            .rule_weights
            .get(&result.rule_id)
            .copied()
            .unwrap_or(1.0);
        components.push(WeightedComponent::new(
            result.rule_id.clone(),
            weight,
            count.pass_ratio().unwrap_or(1.0),
        ));
        explain = explain.with_count(result.rule_id.clone(), count);
    }

    let weighted = combine(&components, AdditiveContribution::default(), &mut log);
    let score = weighted.ratio.unwrap_or(1.0) * MAX_DIMENSION_SCORE;

    DimensionResult::new(Dimension::Plausibility, score)
        .with_findings(findings)
        .with_explain(explain.with_global_weights(weighted.applied_map()))
        .with_warnings(log.into_vec())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::configuration::AssessmentConfig;
    use crate::domain::dataset::Dataset;
    use crate::domain::dimensions::testing::run;
    use crate::domain::standard::RequirementSet;
    use crate::infrastructure::adapters::InMemoryConnector;
    use crate::ports::connector::ExplicitRuleResult;
    use anyhow::Result;

    fn amounts(values: Vec<i64>) -> Result<InMemoryConnector> {
        let dataset = Dataset::builder().column("amount", values).build()?;
        Ok(InMemoryConnector::new("orders", dataset))
    }

    fn reported(rule_id: &str, passed: u64, total: u64) -> ExplicitRuleResult {
        ExplicitRuleResult {
            rule_id: rule_id.to_string(),
            passed,
            total,
        }
    }

    fn assess(connector: &InMemoryConnector) -> Result<DimensionResult> {
        run(
            &PlausibilityAssessor,
            connector,
            &AssessmentConfig::default(),
            &RequirementSet::default(),
        )
    }

    #[test]
    fn test_explicit_rule_results_are_weighted() -> Result<()> {
        let connector = amounts(vec![10, 11, 12, 500])?.with_plausibility(PlausibilityResults {
            has_explicit_plausibility_info: true,
            rule_results: vec![
                reported("range_check", 12, 10),
                reported("ratio_check", 5, 10),
                reported("empty_check", 0, 0),
            ],
        });

        let result = assess(&connector)?;

        // Over-reported passes are capped to the total: (1.0 + 0.5) / 2
        assert_eq!(result.score, 15.0);
        assert!(result.warnings.iter().any(|w| w.contains("'range_check'") && w.contains("capped")));
        assert!(result.findings.iter().any(|f| f.contains("'ratio_check' failed 5 of 10")));
        assert!(result.findings.iter().any(|f| f.contains("'empty_check' reported no checks")));
        let explain = result.explain.unwrap();
        assert_eq!(explain.rule_counts["range_check"], CategoryCount::new(10, 10));
        assert!(!explain.rule_counts.contains_key("empty_check"));
        Ok(())
    }

    #[test]
    fn test_inferred_outliers_lower_the_score() -> Result<()> {
        let clean = assess(&amounts(vec![10, 11, 12, 13, 12, 11])?)?;
        let skewed = assess(&amounts(vec![10, 11, 12, 13, 12, 11, 500])?)?;

        // Inferred scores never exceed the implicit credit share
        assert!(clean.score <= 14.0);
        assert!(skewed.score < clean.score);
        assert!(skewed.findings.iter().any(|f| f.contains("outlier(s)")));
        Ok(())
    }
}
