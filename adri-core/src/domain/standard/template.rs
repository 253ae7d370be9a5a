// adri-core/src/domain/standard/template.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

use crate::domain::dimensions::{Dimension, MAX_DIMENSION_SCORE};
use crate::domain::error::DomainError;
use crate::domain::standard::requirement::{FieldRequirement, RequirementSet};

/// Declarative quality threshold document used to gate compliance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct Standard {
    #[validate(nested)]
    pub template: TemplateInfo,

    #[validate(nested)]
    #[serde(default)]
    pub requirements: Requirements,

    #[validate(nested)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certification: Option<CertificationPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TemplateInfo {
    #[validate(length(min = 1, message = "Template id cannot be empty"))]
    pub id: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(deny_unknown_fields)]
pub struct Requirements {
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_minimum: Option<f64>,

    #[validate(custom(function = "validate_dimension_minimums"))]
    #[serde(default)]
    pub dimension_requirements: BTreeMap<Dimension, DimensionRequirement>,

    #[serde(default)]
    pub field_requirements: BTreeMap<String, FieldRequirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key_fields: Vec<String>,
}

/// Per-dimension threshold. Accepts a bare number or `{ minimum_score, weight }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDimensionRequirement")]
pub struct DimensionRequirement {
    pub minimum_score: f64,
    pub weight: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDimensionRequirement {
    Score(f64),
    Detailed {
        minimum_score: f64,
        #[serde(default = "default_requirement_weight")]
        weight: f64,
    },
}

fn default_requirement_weight() -> f64 {
    1.0
}

impl From<RawDimensionRequirement> for DimensionRequirement {
    fn from(raw: RawDimensionRequirement) -> Self {
        match raw {
            RawDimensionRequirement::Score(minimum_score) => Self {
                minimum_score,
                weight: default_requirement_weight(),
            },
            RawDimensionRequirement::Detailed {
                minimum_score,
                weight,
            } => Self {
                minimum_score,
                weight,
            },
        }
    }
}

impl DimensionRequirement {
    pub fn new(minimum_score: f64) -> Self {
        Self {
            minimum_score,
            weight: default_requirement_weight(),
        }
    }
}

/// Stricter gate on top of compliance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CertificationPolicy {
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default)]
    pub margin: f64,

    #[serde(default)]
    pub require_all_fields: bool,
}

fn validate_dimension_minimums(
    requirements: &BTreeMap<Dimension, DimensionRequirement>,
) -> Result<(), ValidationError> {
    for (dimension, req) in requirements {
        if !(0.0..=MAX_DIMENSION_SCORE).contains(&req.minimum_score) {
            let mut err = ValidationError::new("dimension_minimum_out_of_range");
            err.message = Some(
                format!(
                    "{} minimum_score {} must lie in [0, {}]",
                    dimension, req.minimum_score, MAX_DIMENSION_SCORE
                )
                .into(),
            );
            return Err(err);
        }
        if !req.weight.is_finite() || req.weight < 0.0 {
            let mut err = ValidationError::new("dimension_weight_invalid");
            err.message = Some(format!("{} weight must be a non-negative number", dimension).into());
            return Err(err);
        }
    }
    Ok(())
}

impl Standard {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            template: TemplateInfo {
                id: id.into(),
                version: default_version(),
                name: None,
                description: None,
                authority: None,
            },
            requirements: Requirements::default(),
            certification: None,
        }
    }

    pub fn with_overall_minimum(mut self, minimum: f64) -> Self {
        self.requirements.overall_minimum = Some(minimum);
        self
    }

    pub fn with_dimension_minimum(mut self, dimension: Dimension, minimum: f64) -> Self {
        self.requirements
            .dimension_requirements
            .insert(dimension, DimensionRequirement::new(minimum));
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, requirement: FieldRequirement) -> Self {
        self.requirements
            .field_requirements
            .insert(name.into(), requirement);
        self
    }

    pub fn with_primary_key<S: Into<String>>(mut self, fields: Vec<S>) -> Self {
        self.requirements.primary_key_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_certification(mut self, policy: CertificationPolicy) -> Self {
        self.certification = Some(policy);
        self
    }

    pub fn id(&self) -> &str {
        &self.template.id
    }

    /// Validates thresholds and compiles field requirements.
    pub fn check(&self) -> Result<RequirementSet, DomainError> {
        self.validate().map_err(|e| DomainError::InvalidStandard {
            standard: self.template.id.clone(),
            reason: e.to_string(),
        })?;
        RequirementSet::compile(&self.requirements.field_requirements).map_err(|e| {
            DomainError::InvalidStandard {
                standard: self.template.id.clone(),
                reason: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    const STANDARD_YAML: &str = r#"
template:
  id: customer_data
  version: 2.1.0
  name: Customer Data Standard
requirements:
  overall_minimum: 85
  dimension_requirements:
    completeness: 17
    validity:
      minimum_score: 15
      weight: 2
  field_requirements:
    code:
      type: string
      nullable: false
      allowed_values: [A, B]
      pattern: "^[AB]$"
  primary_key_fields: [code]
certification:
  margin: 5
"#;

    #[test]
    fn test_parse_standard_document() -> Result<()> {
        let standard: Standard = serde_yaml::from_str(STANDARD_YAML)?;
        assert_eq!(standard.id(), "customer_data");
        assert_eq!(standard.requirements.overall_minimum, Some(85.0));

        let completeness = standard.requirements.dimension_requirements[&Dimension::Completeness];
        assert_eq!(completeness.minimum_score, 17.0);
        assert_eq!(completeness.weight, 1.0);

        let validity = standard.requirements.dimension_requirements[&Dimension::Validity];
        assert_eq!(validity.weight, 2.0);

        let compiled = standard.check()?;
        assert_eq!(compiled.required_fields(), vec!["code"]);
        Ok(())
    }

    #[test]
    fn test_rejects_out_of_range_thresholds() {
        let standard = Standard::new("x").with_overall_minimum(120.0);
        assert!(matches!(
            standard.check(),
            Err(DomainError::InvalidStandard { .. })
        ));

        let standard = Standard::new("x").with_dimension_minimum(Dimension::Freshness, 25.0);
        assert!(standard.check().is_err());
    }

    #[test]
    fn test_rejects_empty_id_and_bad_pattern() {
        assert!(Standard::new("").check().is_err());

        let standard = Standard::new("x")
            .with_field("code", FieldRequirement::default().with_pattern("(unclosed"));
        assert!(standard.check().is_err());
    }

    #[test]
    fn test_unknown_dimension_is_rejected_at_load() {
        let yaml = "template: { id: x }\nrequirements:\n  dimension_requirements:\n    timeliness: 10\n";
        let parsed: Result<Standard, _> = serde_yaml::from_str(yaml);
        assert!(parsed.is_err());
    }
}
