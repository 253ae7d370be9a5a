// adri-core/src/domain/standard/requirement.rs

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::dataset::{FieldType, Value};
use crate::domain::error::DomainError;

/// Validity rule categories, in their fixed evaluation order.
/// Iteration over categories always follows this declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Type,
    AllowedValues,
    LengthBounds,
    Pattern,
    NumericBounds,
    DateBounds,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 6] = [
        RuleCategory::Type,
        RuleCategory::AllowedValues,
        RuleCategory::LengthBounds,
        RuleCategory::Pattern,
        RuleCategory::NumericBounds,
        RuleCategory::DateBounds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::AllowedValues => "allowed_values",
            Self::LengthBounds => "length_bounds",
            Self::Pattern => "pattern",
            Self::NumericBounds => "numeric_bounds",
            Self::DateBounds => "date_bounds",
        }
    }

    /// Default global weight of the category.
    pub fn default_weight(&self) -> f64 {
        match self {
            Self::Type => 0.25,
            Self::AllowedValues => 0.20,
            Self::LengthBounds => 0.10,
            Self::Pattern => 0.15,
            Self::NumericBounds => 0.20,
            Self::DateBounds => 0.10,
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown rule category: {}", s))
    }
}

/// Declarative constraint attached to a column name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldRequirement {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,

    #[serde(default = "default_nullable")]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,

    #[serde(default, alias = "after_date", skip_serializing_if = "Option::is_none")]
    pub min_date: Option<NaiveDate>,
    #[serde(default, alias = "before_date", skip_serializing_if = "Option::is_none")]
    pub max_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl Default for FieldRequirement {
    fn default() -> Self {
        Self {
            field_type: None,
            nullable: true,
            allowed_values: None,
            min_length: None,
            max_length: None,
            pattern: None,
            min_value: None,
            max_value: None,
            min_date: None,
            max_date: None,
            description: None,
        }
    }
}

impl FieldRequirement {
    pub fn typed(field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_allowed_values<S: Into<String>>(mut self, values: Vec<S>) -> Self {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn with_dates(mut self, min: Option<NaiveDate>, max: Option<NaiveDate>) -> Self {
        self.min_date = min;
        self.max_date = max;
        self
    }

    /// Whether this requirement configures the given category.
    pub fn applies(&self, category: RuleCategory) -> bool {
        match category {
            RuleCategory::Type => self.field_type.is_some(),
            RuleCategory::AllowedValues => self.allowed_values.is_some(),
            RuleCategory::LengthBounds => self.min_length.is_some() || self.max_length.is_some(),
            RuleCategory::Pattern => self.pattern.is_some(),
            RuleCategory::NumericBounds => self.min_value.is_some() || self.max_value.is_some(),
            RuleCategory::DateBounds => self.min_date.is_some() || self.max_date.is_some(),
        }
    }

    /// Compiles the requirement; fails on a malformed pattern or inverted bounds.
    pub fn compile(&self, field: &str) -> Result<CompiledRequirement, DomainError> {
        let invalid = |reason: String| DomainError::InvalidFieldRequirement {
            field: field.to_string(),
            reason,
        };

        if let (Some(min), Some(max)) = (self.min_length, self.max_length)
            && min > max
        {
            return Err(invalid(format!("min_length {} > max_length {}", min, max)));
        }
        if let (Some(min), Some(max)) = (self.min_value, self.max_value)
            && min > max
        {
            return Err(invalid(format!("min_value {} > max_value {}", min, max)));
        }
        if let (Some(min), Some(max)) = (self.min_date, self.max_date)
            && min > max
        {
            return Err(invalid(format!("min_date {} > max_date {}", min, max)));
        }

        let pattern = self
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| invalid(format!("invalid pattern: {}", e)))?;

        Ok(CompiledRequirement {
            requirement: self.clone(),
            pattern,
        })
    }
}

/// A field requirement with its pattern compiled once.
#[derive(Debug, Clone)]
pub struct CompiledRequirement {
    pub requirement: FieldRequirement,
    pattern: Option<Regex>,
}

impl CompiledRequirement {
    pub fn applies(&self, category: RuleCategory) -> bool {
        self.requirement.applies(category)
    }

    /// Checks a non-null value against one category.
    /// Returns `None` when the category is not configured for this field.
    pub fn check(&self, category: RuleCategory, value: &Value) -> Option<bool> {
        if !self.applies(category) {
            return None;
        }
        let req = &self.requirement;
        let passed = match category {
            RuleCategory::Type => req.field_type.is_some_and(|t| t.conforms(value)),
            RuleCategory::AllowedValues => {
                let text = value.as_text();
                let text = text.trim();
                req.allowed_values
                    .as_ref()
                    .is_some_and(|allowed| allowed.iter().any(|a| a == text))
            }
            RuleCategory::LengthBounds => {
                let len = value.as_text().chars().count();
                req.min_length.is_none_or(|min| len >= min)
                    && req.max_length.is_none_or(|max| len <= max)
            }
            RuleCategory::Pattern => self
                .pattern
                .as_ref()
                .is_some_and(|re| re.is_match(&value.as_text())),
            RuleCategory::NumericBounds => value.as_f64().is_some_and(|x| {
                req.min_value.is_none_or(|min| x >= min) && req.max_value.is_none_or(|max| x <= max)
            }),
            RuleCategory::DateBounds => value.as_date().is_some_and(|d| {
                req.min_date.is_none_or(|min| d >= min) && req.max_date.is_none_or(|max| d <= max)
            }),
        };
        Some(passed)
    }
}

/// Compiled requirements keyed by field name (sorted, for deterministic iteration).
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    fields: BTreeMap<String, CompiledRequirement>,
}

impl RequirementSet {
    pub fn compile(requirements: &BTreeMap<String, FieldRequirement>) -> Result<Self, DomainError> {
        let mut fields = BTreeMap::new();
        for (name, req) in requirements {
            fields.insert(name.clone(), req.compile(name)?);
        }
        Ok(Self { fields })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&CompiledRequirement> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CompiledRequirement)> {
        self.fields.iter()
    }

    /// Fields declared non-nullable.
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, r)| !r.requirement.nullable)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_category_order_is_declaration_order() {
        let mut shuffled = vec![
            RuleCategory::DateBounds,
            RuleCategory::Type,
            RuleCategory::Pattern,
        ];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![RuleCategory::Type, RuleCategory::Pattern, RuleCategory::DateBounds]
        );
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "allowed_values".parse::<RuleCategory>().unwrap(),
            RuleCategory::AllowedValues
        );
        assert!("checksum".parse::<RuleCategory>().is_err());
    }

    #[test]
    fn test_checks_per_category() -> Result<()> {
        let req = FieldRequirement::typed(FieldType::String)
            .with_allowed_values(vec!["A", "B"])
            .with_pattern("^[AB]$")
            .with_length(Some(1), Some(1))
            .compile("code")?;

        assert_eq!(req.check(RuleCategory::AllowedValues, &Value::from("A")), Some(true));
        assert_eq!(req.check(RuleCategory::AllowedValues, &Value::from("C")), Some(false));
        assert_eq!(req.check(RuleCategory::Pattern, &Value::from("AB")), Some(false));
        assert_eq!(req.check(RuleCategory::LengthBounds, &Value::from("AB")), Some(false));
        assert_eq!(req.check(RuleCategory::NumericBounds, &Value::from("A")), None);
        Ok(())
    }

    #[test]
    fn test_numeric_and_date_bounds() -> Result<()> {
        let req = FieldRequirement::default()
            .with_range(Some(0.0), Some(120.0))
            .with_dates(NaiveDate::from_ymd_opt(2020, 1, 1), None)
            .compile("age")?;
        assert_eq!(req.check(RuleCategory::NumericBounds, &Value::Integer(30)), Some(true));
        assert_eq!(req.check(RuleCategory::NumericBounds, &Value::Integer(130)), Some(false));
        assert_eq!(req.check(RuleCategory::NumericBounds, &Value::from("n/a")), Some(false));
        assert_eq!(
            req.check(RuleCategory::DateBounds, &Value::from("2019-12-31")),
            Some(false)
        );
        Ok(())
    }

    #[test]
    fn test_compile_rejects_bad_pattern_and_bounds() {
        let bad_pattern = FieldRequirement::default().with_pattern("[unclosed");
        assert!(bad_pattern.compile("x").is_err());

        let inverted = FieldRequirement::default().with_range(Some(10.0), Some(1.0));
        assert!(matches!(
            inverted.compile("x"),
            Err(DomainError::InvalidFieldRequirement { .. })
        ));
    }

    #[test]
    fn test_yaml_requirement_rejects_unknown_keys() {
        let ok: Result<FieldRequirement, _> =
            serde_yaml::from_str("type: integer\nnullable: false\nmin_value: 0");
        assert!(ok.is_ok());
        let unknown: Result<FieldRequirement, _> = serde_yaml::from_str("type: integer\nfoo: 1");
        assert!(unknown.is_err());
    }
}
