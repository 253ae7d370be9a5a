// adri-core/src/domain/scoring/counts.rs

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::dataset::Dataset;
use crate::domain::standard::{RequirementSet, RuleCategory};

/// Tally of checks for one (rule category, field) pair. `passed <= total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub total: u64,
    pub passed: u64,
}

impl CategoryCount {
    pub fn new(total: u64, passed: u64) -> Self {
        Self {
            total,
            passed: passed.min(total),
        }
    }

    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        }
    }

    pub fn merge(&mut self, other: CategoryCount) {
        self.total += other.total;
        self.passed += other.passed;
    }

    pub fn failed(&self) -> u64 {
        self.total - self.passed
    }

    pub fn is_active(&self) -> bool {
        self.total > 0
    }

    /// `None` when nothing was checked.
    pub fn pass_ratio(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.passed as f64 / self.total as f64)
        }
    }
}

/// Count phase output: per-category tallies plus the per-field breakdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCountTable {
    pub rule_counts: BTreeMap<RuleCategory, CategoryCount>,
    pub per_field_counts: BTreeMap<String, BTreeMap<RuleCategory, CategoryCount>>,
    /// Fields with a requirement but no column in the dataset.
    pub missing_fields: Vec<String>,
}

impl RuleCountTable {
    /// Scans every non-null value of every constrained field.
    /// A value failing its type check is not evaluated against the remaining categories.
    pub fn build(dataset: &Dataset, requirements: &RequirementSet) -> Self {
        let mut table = RuleCountTable {
            rule_counts: RuleCategory::ALL
                .iter()
                .map(|c| (*c, CategoryCount::default()))
                .collect(),
            ..Default::default()
        };

        for (name, req) in requirements.iter() {
            let Some(column) = dataset.column(name) else {
                table.missing_fields.push(name.clone());
                continue;
            };

            let mut field_counts: BTreeMap<RuleCategory, CategoryCount> = RuleCategory::ALL
                .iter()
                .filter(|c| req.applies(**c))
                .map(|c| (*c, CategoryCount::default()))
                .collect();

            for value in column.non_null() {
                for category in RuleCategory::ALL {
                    let Some(passed) = req.check(category, value) else {
                        continue;
                    };
                    field_counts.entry(category).or_default().record(passed);
                    if category == RuleCategory::Type && !passed {
                        break;
                    }
                }
            }

            for (category, count) in &field_counts {
                table.rule_counts.entry(*category).or_default().merge(*count);
            }
            table.per_field_counts.insert(name.clone(), field_counts);
        }

        table
    }

    /// Categories with at least one check, in declaration order.
    pub fn active_categories(&self) -> Vec<RuleCategory> {
        RuleCategory::ALL
            .into_iter()
            .filter(|c| self.rule_counts.get(c).is_some_and(CategoryCount::is_active))
            .collect()
    }

    pub fn count(&self, category: RuleCategory) -> CategoryCount {
        self.rule_counts.get(&category).copied().unwrap_or_default()
    }

    pub fn field_count(&self, field: &str, category: RuleCategory) -> Option<CategoryCount> {
        self.per_field_counts
            .get(field)
            .and_then(|counts| counts.get(&category))
            .copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::{FieldType, Value};
    use crate::domain::standard::FieldRequirement;
    use anyhow::Result;

    fn requirements() -> Result<RequirementSet> {
        let mut reqs = BTreeMap::new();
        reqs.insert(
            "code".to_string(),
            FieldRequirement::default()
                .with_allowed_values(vec!["A", "B"])
                .with_pattern("^[AB]$"),
        );
        reqs.insert(
            "age".to_string(),
            FieldRequirement::typed(FieldType::Integer).with_range(Some(0.0), Some(120.0)),
        );
        reqs.insert("ghost".to_string(), FieldRequirement::default().required());
        Ok(RequirementSet::compile(&reqs)?)
    }

    #[test]
    fn test_count_phase_tallies() -> Result<()> {
        let ds = Dataset::builder()
            .column("code", vec![Value::from("A"), Value::from("C"), Value::Null])
            .column("age", vec![Value::Integer(10), Value::from("old"), Value::Integer(130)])
            .build()?;
        let table = RuleCountTable::build(&ds, &requirements()?);

        assert_eq!(table.count(RuleCategory::AllowedValues), CategoryCount::new(2, 1));
        assert_eq!(table.count(RuleCategory::Pattern), CategoryCount::new(2, 1));
        // "old" fails the type check and is not counted for numeric bounds
        assert_eq!(table.count(RuleCategory::Type), CategoryCount::new(3, 2));
        assert_eq!(table.count(RuleCategory::NumericBounds), CategoryCount::new(2, 1));
        assert_eq!(table.count(RuleCategory::DateBounds), CategoryCount::default());
        assert_eq!(table.missing_fields, vec!["ghost".to_string()]);

        assert_eq!(
            table.active_categories(),
            vec![
                RuleCategory::Type,
                RuleCategory::AllowedValues,
                RuleCategory::Pattern,
                RuleCategory::NumericBounds
            ]
        );
        assert_eq!(
            table.field_count("code", RuleCategory::Pattern),
            Some(CategoryCount::new(2, 1))
        );
        assert_eq!(table.field_count("code", RuleCategory::Type), None);
        Ok(())
    }

    #[test]
    fn test_passed_never_exceeds_total() -> Result<()> {
        let ds = Dataset::builder()
            .column("code", vec!["A", "B", "B", "Z"])
            .column("age", vec![1, 2, 3, 4])
            .build()?;
        let table = RuleCountTable::build(&ds, &requirements()?);
        for counts in table.per_field_counts.values() {
            for count in counts.values() {
                assert!(count.passed <= count.total);
            }
        }
        assert_eq!(CategoryCount::new(2, 5).passed, 2);
        Ok(())
    }
}
