// adri-core/src/infrastructure/config/standard.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::domain::standard::Standard;
use crate::error::AdriError;
use crate::infrastructure::error::InfrastructureError;

/// Reads, parses and validates one standard document.
/// Thresholds and field patterns are checked here, not at assessment time.
#[instrument]
pub fn load_standard(path: &Path) -> Result<Standard, AdriError> {
    let content = fs::read_to_string(path)?;
    let standard = parse_standard(&content)?;
    info!(id = standard.id(), "Standard loaded");
    Ok(standard)
}

pub fn parse_standard(content: &str) -> Result<Standard, AdriError> {
    let standard: Standard =
        serde_yaml::from_str(content).map_err(InfrastructureError::YamlError)?;
    standard.check()?;
    Ok(standard)
}

/// Every valid standard under a directory, keyed by template id.
#[derive(Debug, Default)]
pub struct StandardCatalog {
    standards: BTreeMap<String, Standard>,
    sources: BTreeMap<String, PathBuf>,
    skipped: Vec<(PathBuf, String)>,
}

impl StandardCatalog {
    /// Walks `dir` in file-name order. Documents that are not valid standards are
    /// skipped and listed in [`StandardCatalog::skipped`]; on duplicate ids the
    /// later file wins.
    #[instrument]
    pub fn discover(dir: &Path) -> Result<Self, AdriError> {
        let mut catalog = StandardCatalog::default();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                std::io::Error::other(format!("cannot walk {:?}: {}", dir, e))
            })?;
            let path = entry.path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == "yaml" || e == "yml");
            if !entry.file_type().is_file() || !is_yaml {
                continue;
            }

            match load_standard(path) {
                Ok(standard) => {
                    let id = standard.id().to_string();
                    if let Some(previous) = catalog.sources.get(&id) {
                        warn!(id = %id, previous = ?previous, path = ?path, "Duplicate standard id; later file wins");
                    }
                    catalog.sources.insert(id.clone(), path.to_path_buf());
                    catalog.standards.insert(id, standard);
                }
                Err(e) => {
                    debug!(path = ?path, error = %e, "Skipping document");
                    catalog.skipped.push((path.to_path_buf(), e.to_string()));
                }
            }
        }

        info!(
            count = catalog.standards.len(),
            skipped = catalog.skipped.len(),
            "Standards discovered"
        );
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Standard> {
        self.standards.get(id)
    }

    pub fn path_of(&self, id: &str) -> Option<&Path> {
        self.sources.get(id).map(PathBuf::as_path)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.standards.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.standards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standards.is_empty()
    }

    pub fn skipped(&self) -> &[(PathBuf, String)] {
        &self.skipped
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use anyhow::Result;
    use tempfile::tempdir;

    const ORDERS: &str = r#"
template:
  id: orders
requirements:
  overall_minimum: 75
  field_requirements:
    order_id: { type: integer, nullable: false }
"#;

    #[test]
    fn test_bad_pattern_is_rejected_at_load() {
        let yaml = r#"
template: { id: broken }
requirements:
  field_requirements:
    code: { pattern: "([a-z" }
"#;
        let err = parse_standard(yaml).unwrap_err();
        assert!(matches!(
            err,
            AdriError::Domain(DomainError::InvalidStandard { .. })
        ));
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let yaml = "template: { id: x }\nrequirements: { overall_minimum: 140 }\n";
        assert!(parse_standard(yaml).is_err());
    }

    #[test]
    fn test_catalog_discovers_nested_documents() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("finance"))?;
        fs::write(dir.path().join("finance").join("orders.yaml"), ORDERS)?;
        fs::write(dir.path().join("customers.yml"), "template: { id: customers }\n")?;
        fs::write(dir.path().join("adri-config.yaml"), "readiness: { ready_minimum: 90 }\n")?;
        fs::write(dir.path().join("notes.txt"), "not yaml")?;

        let catalog = StandardCatalog::discover(dir.path())?;

        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["customers", "orders"]);
        assert_eq!(catalog.get("orders").unwrap().requirements.overall_minimum, Some(75.0));
        assert!(catalog.path_of("orders").unwrap().ends_with("finance/orders.yaml"));
        assert_eq!(catalog.skipped().len(), 1);
        Ok(())
    }
}
