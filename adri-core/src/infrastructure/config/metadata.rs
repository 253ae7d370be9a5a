// adri-core/src/infrastructure/config/metadata.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::infrastructure::error::InfrastructureError;
use crate::ports::connector::SourceMetadata;

/// Loads a metadata sidecar (`metadata`, `completeness`, `freshness`, `plausibility`).
#[instrument]
pub fn load_source_metadata(path: &Path) -> Result<SourceMetadata, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(SourceMetadata::default());
    }
    let metadata: SourceMetadata = serde_yaml::from_str(&content)?;
    debug!(
        explicit_completeness = metadata.completeness.is_some(),
        explicit_freshness = metadata.freshness.is_some(),
        explicit_plausibility = metadata.plausibility.is_some(),
        "Source metadata loaded"
    );
    Ok(metadata)
}

/// Conventional sidecar location: `orders.csv` -> `orders.metadata.yaml`.
pub fn sidecar_path(data_path: &Path) -> PathBuf {
    let stem = data_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    data_path.with_file_name(format!("{}.metadata.yaml", stem))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_sidecar_path_follows_data_file() {
        assert_eq!(
            sidecar_path(Path::new("/data/orders.csv")),
            PathBuf::from("/data/orders.metadata.yaml")
        );
    }

    #[test]
    fn test_load_sidecar() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("orders.metadata.yaml");
        fs::write(
            &path,
            r#"
metadata:
  owner: finance
freshness:
  has_explicit_freshness_info: true
  last_updated: 2024-06-01T00:00:00Z
  max_age_hours: 24
plausibility:
  has_explicit_plausibility_info: true
  rule_results:
    - { rule_id: amount_positive, passed: 98, total: 100 }
"#,
        )?;

        let metadata = load_source_metadata(&path)?;
        assert_eq!(metadata.metadata["owner"], "finance");
        let freshness = metadata.freshness.unwrap();
        assert!(freshness.has_explicit_freshness_info);
        assert_eq!(freshness.max_age_hours, Some(24.0));
        assert_eq!(metadata.plausibility.unwrap().rule_results[0].passed, 98);
        assert!(metadata.completeness.is_none());
        Ok(())
    }
}
