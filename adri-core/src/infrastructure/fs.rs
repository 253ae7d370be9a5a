// adri-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes `content` to `path` through a sibling temp file, then renames it over the target.
///
/// Readers either see the previous report or the new one, never a truncated file.
/// Missing parent directories are created first.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Same directory, so the final rename never crosses a filesystem boundary
    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    staged.write_all(content.as_ref())?;
    staged.flush()?;

    staged
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_creates_missing_report_directory() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("reports").join("2024").join("orders.json");

        atomic_write(&target, "{\"ok\":true}")?;

        assert_eq!(fs::read_to_string(&target)?, "{\"ok\":true}");
        Ok(())
    }

    #[test]
    fn test_replaces_previous_report_without_leftovers() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("orders.json");

        atomic_write(&target, "first")?;
        atomic_write(&target, "second")?;

        assert_eq!(fs::read_to_string(&target)?, "second");
        let entries = fs::read_dir(dir.path())?.count();
        assert_eq!(entries, 1, "staged temp files must not survive");
        Ok(())
    }
}
