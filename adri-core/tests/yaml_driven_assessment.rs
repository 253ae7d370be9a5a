// adri-core/tests/yaml_driven_assessment.rs

#![allow(clippy::unwrap_used)]

use adri_core::infrastructure::config::{parse_assessment_config, parse_standard};
use adri_core::{Assessor, DataGuard, Dataset, Dimension, GuardDecision, InMemoryConnector, OnFailure};
use anyhow::Result;
use chrono::{TimeZone, Utc};

const CONFIG: &str = r#"
readiness:
  ready_minimum: 90
validity:
  rule_weights:
    pattern: 2
  field_overrides:
    sku:
      pattern: 0.5
consistency:
  rule_weights:
    consistency.cross_field: 2
rules:
  - id: consistency.cross_field
    params: { left: shipped_qty, operator: "<=", right: ordered_qty }
  - id: consistency.does_not_exist
"#;

const STANDARD: &str = r#"
template:
  id: inventory
  version: 2.1.0
requirements:
  overall_minimum: 50
  dimension_requirements:
    consistency: 18
  field_requirements:
    sku:
      type: string
      nullable: false
      pattern: "^SKU-[0-9]{3}$"
    ordered_qty:
      type: integer
      min_value: 1
  primary_key_fields: [sku]
"#;

fn inventory(shipped: Vec<i64>) -> Result<Dataset> {
    Ok(Dataset::builder()
        .column("sku", vec!["SKU-001", "SKU-002", "SKU-003", "SKU-004"])
        .column("ordered_qty", vec![5_i64, 2, 8, 1])
        .column("shipped_qty", shipped)
        .build()?)
}

#[test]
fn test_yaml_config_and_standard_drive_the_assessment() -> Result<()> {
    let config = parse_assessment_config(CONFIG)?;
    let standard = parse_standard(STANDARD)?;
    assert_eq!(standard.template.version, "2.1.0");

    let report = Assessor::new(config)
        .with_standard(standard)?
        .as_of(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        .assess(&InMemoryConnector::new("inventory", inventory(vec![5, 2, 8, 1])?))?;

    assert_eq!(report.standard_id(), Some("inventory"));
    assert_eq!(report.dimension_score(Dimension::Validity), 20.0);
    assert_eq!(report.dimension_score(Dimension::Consistency), 20.0);

    let explain = report.explain(Dimension::Validity).unwrap();
    assert_eq!(explain.applied_weights.global.get("pattern"), Some(&2.0));
    assert_eq!(explain.applied_weights.overrides["sku"]["pattern"], 0.5);

    // The unknown rule id degrades into a warning, the cross-field rule still runs
    assert!(
        report
            .warnings()
            .iter()
            .any(|w| w.contains("consistency.does_not_exist"))
    );
    let consistency = report.explain(Dimension::Consistency).unwrap();
    assert!(consistency.rule_counts.contains_key("consistency.cross_field"));
    Ok(())
}

#[test]
fn test_guard_blocks_inconsistent_shipments() -> Result<()> {
    let guard = DataGuard::new(parse_standard(STANDARD)?, parse_assessment_config(CONFIG)?)?;

    let clean = guard.check_dataset("inventory", inventory(vec![5, 2, 8, 1])?)?;
    assert_eq!(clean.decision, GuardDecision::Allow);

    // Every row ships more than ordered
    let overshipped = guard.check_dataset("inventory", inventory(vec![6, 3, 9, 2])?)?;
    assert_eq!(overshipped.decision, GuardDecision::Block);
    assert!(!overshipped.allowed);
    assert!(overshipped.evaluation.gap("consistency").is_some());

    let lenient = guard.on_failure(OnFailure::Warn);
    let warned = lenient.check_dataset("inventory", inventory(vec![6, 3, 9, 2])?)?;
    assert_eq!(warned.decision, GuardDecision::AllowWithWarnings);
    assert!(warned.allowed);
    Ok(())
}
