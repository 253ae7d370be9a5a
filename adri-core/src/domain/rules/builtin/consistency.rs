// adri-core/src/domain/rules/builtin/consistency.rs

use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::domain::dataset::{Column, Dataset, Value};
use crate::domain::dimensions::Dimension;
use crate::domain::error::DomainError;
use crate::domain::rules::{Rule, RuleDescriptor, RuleParams, RuleResult, default_rule_weight};
use crate::domain::scoring::CategoryCount;

pub const PRIMARY_KEY_RULE: &str = "consistency.primary_key";
pub const TYPE_HOMOGENEITY_RULE: &str = "consistency.type_homogeneity";
pub const CROSS_FIELD_RULE: &str = "consistency.cross_field";
pub const CALCULATION_RULE: &str = "consistency.calculation";

const MAX_EXAMPLES: usize = 5;

fn missing_columns<'a>(dataset: &Dataset, fields: &'a [String]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|f| !dataset.has_column(f))
        .map(String::as_str)
        .collect()
}

fn columns<'d>(dataset: &'d Dataset, fields: &[String]) -> Vec<&'d Column> {
    fields.iter().filter_map(|f| dataset.column(f)).collect()
}

// --- Primary key ----------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrimaryKeyRule {
    pub fields: Vec<String>,
    #[serde(default = "default_rule_weight")]
    pub weight: f64,
}

impl PrimaryKeyRule {
    pub fn new<S: Into<String>>(fields: Vec<S>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            weight: default_rule_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Rule for PrimaryKeyRule {
    fn id(&self) -> &str {
        PRIMARY_KEY_RULE
    }

    fn dimension(&self) -> Dimension {
        Dimension::Consistency
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    /// A row passes when its composite key is complete and seen for the first time.
    fn evaluate(&self, dataset: &Dataset) -> RuleResult {
        let missing = missing_columns(dataset, &self.fields);
        if !missing.is_empty() {
            return RuleResult::not_applicable(
                self.weight,
                format!("primary key field(s) missing from dataset: {}", missing.join(", ")),
            );
        }
        if dataset.is_empty() {
            return RuleResult::not_applicable(self.weight, "dataset has no rows to check keys");
        }

        let key_columns = columns(dataset, &self.fields);
        let mut seen: HashMap<Vec<String>, usize> = HashMap::new();
        let mut count = CategoryCount::default();
        let mut null_keys = 0u64;
        let mut duplicates: Vec<String> = Vec::new();

        for row in 0..dataset.row_count() {
            let cells: Vec<&Value> = key_columns.iter().map(|c| &c.values[row]).collect();
            if cells.iter().any(|v| v.is_null()) {
                null_keys += 1;
                count.record(false);
                continue;
            }
            let key: Vec<String> = cells.iter().map(|v| v.as_text().into_owned()).collect();
            let occurrences = seen.entry(key.clone()).or_insert(0);
            *occurrences += 1;
            count.record(*occurrences == 1);
            if *occurrences == 2 && duplicates.len() < MAX_EXAMPLES {
                duplicates.push(key.join("|"));
            }
        }

        let duplicate_rows = count.failed() - null_keys;
        let mut findings = Vec::new();
        if duplicate_rows > 0 {
            findings.push(format!(
                "{} duplicate row(s) for key ({}); e.g. {}",
                duplicate_rows,
                self.fields.join(", "),
                duplicates.join(", ")
            ));
        }
        if null_keys > 0 {
            findings.push(format!(
                "{} row(s) with a null primary key component",
                null_keys
            ));
        }

        RuleResult::from_counts(self.weight, count, findings)
            .with_detail("duplicate_rows", duplicate_rows)
            .with_detail("null_keys", null_keys)
            .with_detail("key_fields", self.fields.clone())
    }

    fn generate_narrative(&self, result: &RuleResult) -> String {
        let duplicates = result.detail_u64("duplicate_rows").unwrap_or(0);
        let nulls = result.detail_u64("null_keys").unwrap_or(0);
        if duplicates == 0 && nulls == 0 {
            format!("Key ({}) is unique across the dataset.", self.fields.join(", "))
        } else {
            format!(
                "Key ({}) has {} duplicate and {} incomplete row(s).",
                self.fields.join(", "),
                duplicates,
                nulls
            )
        }
    }
}

// --- Type homogeneity -----------------------------------------------------

/// Every non-null value of a column shares one kind (or conforms to the declared type).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeHomogeneityRule {
    /// Columns to check; every column when absent.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default = "default_rule_weight")]
    pub weight: f64,
}

impl TypeHomogeneityRule {
    pub fn all_columns() -> Self {
        Self {
            fields: None,
            weight: default_rule_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Rule for TypeHomogeneityRule {
    fn id(&self) -> &str {
        TYPE_HOMOGENEITY_RULE
    }

    fn dimension(&self) -> Dimension {
        Dimension::Consistency
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleResult {
        let targets: Vec<&Column> = match &self.fields {
            Some(fields) => columns(dataset, fields),
            None => dataset.columns().iter().collect(),
        };

        let mut count = CategoryCount::default();
        let mut mixed: BTreeMap<String, u64> = BTreeMap::new();
        for column in targets {
            let mut column_count = CategoryCount::default();
            match column.declared_type {
                Some(declared) => {
                    for value in column.non_null() {
                        column_count.record(declared.conforms(value));
                    }
                }
                None => {
                    let Some(dominant) = column.dominant_kind() else {
                        continue;
                    };
                    for value in column.non_null() {
                        column_count.record(value.kind() == dominant);
                    }
                }
            }
            if column_count.failed() > 0 {
                mixed.insert(column.name.clone(), column_count.failed());
            }
            count.merge(column_count);
        }

        if count.total == 0 {
            return RuleResult::not_applicable(self.weight, "no non-null values to compare types");
        }

        let findings = mixed
            .iter()
            .map(|(name, failed)| {
                format!("column '{}' mixes value types ({} outlier value(s))", name, failed)
            })
            .collect();
        let mixed_columns: Vec<String> = mixed.into_keys().collect();
        RuleResult::from_counts(self.weight, count, findings)
            .with_detail("mixed_columns", mixed_columns)
    }
}

// --- Cross-field comparison -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[serde(alias = "<")]
    Lt,
    #[serde(alias = "<=")]
    Le,
    #[serde(alias = "==", alias = "=")]
    Eq,
    #[serde(alias = "!=")]
    Ne,
    #[serde(alias = ">=")]
    Ge,
    #[serde(alias = ">")]
    Gt,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Ge => ordering != Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
        }
    }
}

/// Compares numbers first, then instants, then text.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l.partial_cmp(&r);
    }
    if let (Some(l), Some(r)) = (left.as_datetime(), right.as_datetime()) {
        return Some(l.cmp(&r));
    }
    Some(left.as_text().cmp(&right.as_text()))
}

/// `left <op> right` must hold on every row where both sides are present.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrossFieldRule {
    pub left: String,
    #[serde(rename = "operator", alias = "op")]
    pub comparison: Comparison,
    pub right: String,
    #[serde(default = "default_rule_weight")]
    pub weight: f64,
}

impl Rule for CrossFieldRule {
    fn id(&self) -> &str {
        CROSS_FIELD_RULE
    }

    fn dimension(&self) -> Dimension {
        Dimension::Consistency
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleResult {
        let (Some(left), Some(right)) = (dataset.column(&self.left), dataset.column(&self.right))
        else {
            return RuleResult::not_applicable(
                self.weight,
                format!(
                    "cross-field check needs both '{}' and '{}' in the dataset",
                    self.left, self.right
                ),
            );
        };

        let mut count = CategoryCount::default();
        for (l, r) in left.values.iter().zip(&right.values) {
            if l.is_null() || r.is_null() {
                continue;
            }
            let holds = compare_values(l, r).is_some_and(|o| self.comparison.holds(o));
            count.record(holds);
        }
        if count.total == 0 {
            return RuleResult::not_applicable(
                self.weight,
                format!("no rows with both '{}' and '{}' present", self.left, self.right),
            );
        }

        let findings = if count.failed() > 0 {
            vec![format!(
                "{} row(s) violate {} {} {}",
                count.failed(),
                self.left,
                self.comparison.symbol(),
                self.right
            )]
        } else {
            Vec::new()
        };
        RuleResult::from_counts(self.weight, count, findings)
    }
}

// --- Calculation ----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Calculation {
    Sum,
    Difference,
    Product,
}

impl Calculation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Difference => "difference",
            Self::Product => "product",
        }
    }
}

fn default_tolerance() -> f64 {
    0.01
}

/// `result == operation(operands)` within an absolute tolerance.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalculationRule {
    pub result: String,
    pub operands: Vec<String>,
    #[serde(default = "default_calculation")]
    pub operation: Calculation,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_rule_weight")]
    pub weight: f64,
}

fn default_calculation() -> Calculation {
    Calculation::Sum
}

impl CalculationRule {
    fn compute(&self, operands: &[f64]) -> Option<f64> {
        let (first, rest) = operands.split_first()?;
        Some(match self.operation {
            Calculation::Sum => operands.iter().sum(),
            Calculation::Product => operands.iter().product(),
            Calculation::Difference => rest.iter().fold(*first, |acc, x| acc - x),
        })
    }
}

impl Rule for CalculationRule {
    fn id(&self) -> &str {
        CALCULATION_RULE
    }

    fn dimension(&self) -> Dimension {
        Dimension::Consistency
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn evaluate(&self, dataset: &Dataset) -> RuleResult {
        let mut fields = self.operands.clone();
        fields.push(self.result.clone());
        let missing = missing_columns(dataset, &fields);
        if !missing.is_empty() || self.operands.is_empty() {
            return RuleResult::not_applicable(
                self.weight,
                format!("calculation fields missing from dataset: {}", missing.join(", ")),
            );
        }

        let operand_columns = columns(dataset, &self.operands);
        let Some(result_column) = dataset.column(&self.result) else {
            return RuleResult::not_applicable(self.weight, "calculation result field missing");
        };

        let mut count = CategoryCount::default();
        for row in 0..dataset.row_count() {
            let operands: Option<Vec<f64>> = operand_columns
                .iter()
                .map(|c| c.values[row].as_f64())
                .collect();
            let (Some(operands), Some(actual)) = (operands, result_column.values[row].as_f64())
            else {
                continue;
            };
            let holds = self
                .compute(&operands)
                .is_some_and(|expected| (expected - actual).abs() <= self.tolerance);
            count.record(holds);
        }
        if count.total == 0 {
            return RuleResult::not_applicable(self.weight, "no numeric rows to verify calculation");
        }

        let findings = if count.failed() > 0 {
            vec![format!(
                "{} row(s) where '{}' != {} of ({})",
                count.failed(),
                self.result,
                self.operation.as_str(),
                self.operands.join(", ")
            )]
        } else {
            Vec::new()
        };
        RuleResult::from_counts(self.weight, count, findings)
    }
}

fn boxed<R: Rule + 'static>(rule: R) -> Box<dyn Rule> {
    Box::new(rule)
}

pub(super) fn descriptors() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor::new(
            PRIMARY_KEY_RULE,
            Dimension::Consistency,
            "Composite key values are unique and complete",
            |params: &RuleParams| {
                let rule: PrimaryKeyRule = params.parse(PRIMARY_KEY_RULE)?;
                if rule.fields.is_empty() {
                    return Err(DomainError::InvalidRuleParams {
                        rule: PRIMARY_KEY_RULE.to_string(),
                        reason: "'fields' must name at least one column".to_string(),
                    });
                }
                Ok(boxed(rule))
            },
        ),
        RuleDescriptor::new(
            TYPE_HOMOGENEITY_RULE,
            Dimension::Consistency,
            "Values of a column share one type",
            |params: &RuleParams| Ok(boxed(params.parse::<TypeHomogeneityRule>(TYPE_HOMOGENEITY_RULE)?)),
        ),
        RuleDescriptor::new(
            CROSS_FIELD_RULE,
            Dimension::Consistency,
            "Row-wise comparison between two fields",
            |params: &RuleParams| Ok(boxed(params.parse::<CrossFieldRule>(CROSS_FIELD_RULE)?)),
        ),
        RuleDescriptor::new(
            CALCULATION_RULE,
            Dimension::Consistency,
            "A field equals the sum, difference or product of others",
            |params: &RuleParams| {
                let rule: CalculationRule = params.parse(CALCULATION_RULE)?;
                if rule.operands.is_empty() {
                    return Err(DomainError::InvalidRuleParams {
                        rule: CALCULATION_RULE.to_string(),
                        reason: "'operands' must name at least one column".to_string(),
                    });
                }
                if !rule.tolerance.is_finite() || rule.tolerance < 0.0 {
                    return Err(DomainError::InvalidRuleParams {
                        rule: CALCULATION_RULE.to_string(),
                        reason: format!(
                            "'tolerance' must be a non-negative number, got {}",
                            rule.tolerance
                        ),
                    });
                }
                Ok(boxed(rule))
            },
        ),
    ]
}
