// adri-core/src/domain/rules/builtin/validity.rs

use serde_json::Value as JsonValue;

use crate::domain::dataset::Dataset;
use crate::domain::dimensions::Dimension;
use crate::domain::error::DomainError;
use crate::domain::rules::{Rule, RuleDescriptor, RuleParams, RuleResult, default_rule_weight};
use crate::domain::scoring::CategoryCount;
use crate::domain::standard::{CompiledRequirement, FieldRequirement, RuleCategory};

/// Single-field check of one requirement category, using the same per-value checks as
/// the count phase.
#[derive(Debug)]
pub struct FieldCheckRule {
    id: String,
    category: RuleCategory,
    field: String,
    weight: f64,
    requirement: CompiledRequirement,
}

impl FieldCheckRule {
    pub fn rule_id(category: RuleCategory) -> String {
        format!("validity.{}", category.as_str())
    }

    /// Params: `field`, optional `weight`, plus the requirement keys of the category
    /// (e.g. `allowed_values`, `pattern`, `min_value`).
    pub fn from_params(category: RuleCategory, params: &RuleParams) -> Result<Self, DomainError> {
        let id = Self::rule_id(category);
        let invalid = |reason: String| DomainError::InvalidRuleParams {
            rule: id.clone(),
            reason,
        };

        let mut map = params.as_map().clone();
        let field = match map.remove("field") {
            Some(JsonValue::String(field)) if !field.is_empty() => field,
            _ => return Err(invalid("'field' must be a non-empty string".into())),
        };
        let weight = match map.remove("weight") {
            None => default_rule_weight(),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| invalid("'weight' must be a number".into()))?,
        };

        let requirement: FieldRequirement = RuleParams::from(map).parse(&id)?;
        if !requirement.applies(category) {
            return Err(invalid(format!(
                "no {} constraint given for field '{}'",
                category, field
            )));
        }
        let requirement = requirement
            .compile(&field)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            id,
            category,
            field,
            weight,
            requirement,
        })
    }
}

impl Rule for FieldCheckRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> Dimension {
        Dimension::Validity
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleResult {
        let Some(column) = dataset.column(&self.field) else {
            return RuleResult::not_applicable(
                self.weight,
                format!("field '{}' not present in dataset", self.field),
            );
        };

        let mut count = CategoryCount::default();
        for value in column.non_null() {
            if let Some(passed) = self.requirement.check(self.category, value) {
                count.record(passed);
            }
        }
        if count.total == 0 {
            return RuleResult::not_applicable(
                self.weight,
                format!("field '{}' has no non-null values to check", self.field),
            );
        }

        let findings = if count.failed() > 0 {
            vec![format!(
                "{} of {} values in '{}' failed the {} check",
                count.failed(),
                count.total,
                self.field,
                self.category
            )]
        } else {
            Vec::new()
        };
        RuleResult::from_counts(self.weight, count, findings)
            .with_detail("field", self.field.as_str())
            .with_detail("category", self.category.as_str())
    }

    fn generate_narrative(&self, result: &RuleResult) -> String {
        let failed = result.detail_u64("failed").unwrap_or(0);
        let total = result.detail_u64("total").unwrap_or(0);
        if !result.is_applicable() || total == 0 {
            return format!(
                "No {} check could be applied to field '{}'.",
                self.category, self.field
            );
        }
        format!(
            "Field '{}' failed the {} check for {} of {} values.",
            self.field, self.category, failed, total
        )
    }
}

pub(super) fn descriptors() -> Vec<RuleDescriptor> {
    RuleCategory::ALL
        .into_iter()
        .map(|category| {
            RuleDescriptor::new(
                FieldCheckRule::rule_id(category),
                Dimension::Validity,
                format!("Checks one field against its {} constraint", category),
                move |params| {
                    FieldCheckRule::from_params(category, params).map(|r| Box::new(r) as Box<dyn Rule>)
                },
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Value;
    use anyhow::Result;
    use serde_json::json;

    fn params(value: JsonValue) -> RuleParams {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_allowed_values_rule() -> Result<()> {
        let rule = FieldCheckRule::from_params(
            RuleCategory::AllowedValues,
            &params(json!({"field": "code", "allowed_values": ["A", "B"], "weight": 2.0})),
        )?;
        let ds = Dataset::builder()
            .column("code", vec![Value::from("A"), Value::from("C"), Value::Null, Value::from("B")])
            .build()?;

        let result = rule.evaluate(&ds);
        assert_eq!(result.counts(), CategoryCount::new(3, 2));
        assert!((result.score - 2.0 * 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(
            rule.generate_narrative(&result),
            "Field 'code' failed the allowed_values check for 1 of 3 values."
        );
        Ok(())
    }

    #[test]
    fn test_absent_or_null_field_is_neutral() -> Result<()> {
        let rule = FieldCheckRule::from_params(
            RuleCategory::Pattern,
            &params(json!({"field": "code", "pattern": "^[AB]$"})),
        )?;
        let missing = Dataset::builder().column("other", vec![1, 2]).build()?;
        let result = rule.evaluate(&missing);
        assert_eq!(result.score, 1.0);
        assert!(result.findings[0].contains("not present"));

        let nulls = Dataset::builder()
            .column("code", vec![Value::Null, Value::Null])
            .build()?;
        assert!(!rule.evaluate(&nulls).is_applicable());
        Ok(())
    }

    #[test]
    fn test_malformed_params_are_rejected() {
        let no_field = params(json!({"pattern": "^x$"}));
        assert!(FieldCheckRule::from_params(RuleCategory::Pattern, &no_field).is_err());

        let wrong_category = params(json!({"field": "a", "pattern": "^x$"}));
        assert!(FieldCheckRule::from_params(RuleCategory::NumericBounds, &wrong_category).is_err());

        let unknown_key = params(json!({"field": "a", "pattern": "^x$", "colour": "red"}));
        assert!(FieldCheckRule::from_params(RuleCategory::Pattern, &unknown_key).is_err());

        let bad_regex = params(json!({"field": "a", "pattern": "(("}));
        assert!(FieldCheckRule::from_params(RuleCategory::Pattern, &bad_regex).is_err());
    }
}
