use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

const AS_OF: &str = "2024-06-01T00:00:00Z";

/// Runs the binary from an empty directory so no stray adri-config.yaml is picked up.
struct AdriTestEnv {
    tmp: TempDir,
    fixtures: PathBuf,
}

impl AdriTestEnv {
    fn new() -> Result<Self> {
        Ok(Self {
            tmp: tempfile::tempdir()?,
            fixtures: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"),
        })
    }

    fn fixture(&self, name: &str) -> PathBuf {
        self.fixtures.join(name)
    }

    fn adri(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("adri"));
        cmd.current_dir(self.tmp.path());
        cmd.env_remove("ADRI_READY_MINIMUM")
            .env_remove("ADRI_MODERATE_MINIMUM")
            .env_remove("ADRI_MAX_AGE_HOURS");
        cmd
    }
}

#[test]
fn test_assess_prints_dimension_table() -> Result<()> {
    let env = AdriTestEnv::new()?;

    env.adri()
        .args(["assess", "--as-of", AS_OF, "--data"])
        .arg(env.fixture("orders.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("validity"))
        .stdout(predicate::str::contains("plausibility"))
        .stdout(predicate::str::contains("Overall:"));
    Ok(())
}

#[test]
fn test_assess_passes_met_standard_and_writes_report() -> Result<()> {
    let env = AdriTestEnv::new()?;
    let output = env.tmp.path().join("reports").join("orders.json");

    env.adri()
        .args(["assess", "--as-of", AS_OF, "--data"])
        .arg(env.fixture("orders.csv"))
        .arg("--standard")
        .arg(env.fixture("orders_standard.yaml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Standard 'orders_basic' met"));

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output)?)?;
    let root = &json["adri_assessment_report"];
    assert_eq!(root["metadata"]["source_name"], "orders");
    assert_eq!(root["metadata"]["source_type"], "csv");
    assert_eq!(root["metadata"]["standard_id"], "orders_basic");
    assert_eq!(root["dimensions"]["validity"]["score"], 20.0);
    assert_eq!(root["dimensions"]["completeness"]["score"], 20.0);
    assert!(root["dimensions"]["validity"]["explain"].is_object());
    Ok(())
}

#[test]
fn test_assess_fails_unmet_standard() -> Result<()> {
    let env = AdriTestEnv::new()?;

    env.adri()
        .args(["assess", "--as-of", AS_OF, "--data"])
        .arg(env.fixture("orders.csv"))
        .arg("--standard")
        .arg(env.fixture("strict_standard.yaml"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Standard 'orders_strict' not met"))
        .stdout(predicate::str::contains("shipping_address"));
    Ok(())
}

#[test]
fn test_assess_missing_data_is_an_error() -> Result<()> {
    let env = AdriTestEnv::new()?;

    env.adri()
        .args(["assess", "--data", "does_not_exist.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Data unavailable"));
    Ok(())
}

#[test]
fn test_validate_accepts_and_rejects_standards() -> Result<()> {
    let env = AdriTestEnv::new()?;

    env.adri()
        .arg("validate")
        .arg(env.fixture("orders_standard.yaml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Standard 'orders_basic' is valid"));

    env.adri()
        .arg("validate")
        .arg(env.fixture("invalid_standard.yaml"))
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_rules_lists_builtins_by_dimension() -> Result<()> {
    let env = AdriTestEnv::new()?;

    env.adri()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("consistency.primary_key"))
        .stdout(predicate::str::contains("validity.pattern"));

    env.adri()
        .args(["rules", "--dimension", "plausibility"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plausibility.outliers"))
        .stdout(predicate::str::contains("validity.type").not());
    Ok(())
}
