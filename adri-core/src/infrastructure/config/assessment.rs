// adri-core/src/infrastructure/config/assessment.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::domain::configuration::AssessmentConfig;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["adri-config.yaml", "adri.yaml"];

pub const ENV_READY_MINIMUM: &str = "ADRI_READY_MINIMUM";
pub const ENV_MODERATE_MINIMUM: &str = "ADRI_MODERATE_MINIMUM";
pub const ENV_MAX_AGE_HOURS: &str = "ADRI_MAX_AGE_HOURS";

/// Discovers the configuration file in `dir`, parses it and layers environment
/// overrides on top.
#[instrument(skip(dir))]
pub fn load_assessment_config(dir: &Path) -> Result<AssessmentConfig, InfrastructureError> {
    // 1. Discovery
    let path = find_assessment_config(dir).ok_or_else(|| {
        InfrastructureError::ConfigNotFound(format!(
            "No configuration file found in {:?}. Checked: {:?}",
            dir, CONFIG_CANDIDATES
        ))
    })?;

    // 2. Parse + 3. Layering
    load_assessment_config_file(&path)
}

/// Loads an explicit configuration file (no discovery).
#[instrument]
pub fn load_assessment_config_file(path: &Path) -> Result<AssessmentConfig, InfrastructureError> {
    info!(path = ?path, "Loading assessment configuration");
    let content = fs::read_to_string(path)?;
    let mut config = parse_assessment_config(&content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// An empty document is the default configuration.
pub fn parse_assessment_config(content: &str) -> Result<AssessmentConfig, InfrastructureError> {
    if content.trim().is_empty() {
        return Ok(AssessmentConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

pub fn find_assessment_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// `ADRI_READY_MINIMUM=90 adri assess ...`. Unparseable values are ignored with a warning.
pub fn apply_env_overrides<F>(config: &mut AssessmentConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let number = |key: &str| -> Option<f64> {
        let raw = lookup(key)?;
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                warn!(key, value = %raw, "Ignoring non-numeric environment override");
                None
            }
        }
    };

    if let Some(v) = number(ENV_READY_MINIMUM) {
        info!(old = config.readiness.ready_minimum, new = v, "Overriding ready_minimum via ENV");
        config.readiness.ready_minimum = v;
    }
    if let Some(v) = number(ENV_MODERATE_MINIMUM) {
        info!(
            old = config.readiness.moderate_minimum,
            new = v,
            "Overriding moderate_minimum via ENV"
        );
        config.readiness.moderate_minimum = v;
    }
    if let Some(v) = number(ENV_MAX_AGE_HOURS) {
        info!(old = ?config.freshness.max_age_hours, new = v, "Overriding max_age_hours via ENV");
        config.freshness.max_age_hours = Some(v);
    }
}
