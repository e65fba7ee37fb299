//! Atomic JSON persistence for run artifacts such as the id mapping.
//!
//! Writes go to a temp file with a PID suffix, are synced, then renamed over
//! the target so an interrupted run never leaves a truncated mapping behind.

use crate::{MigrateError, Result};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process;
use tracing::debug;

/// Write `data` as pretty JSON to `path` atomically.
pub fn write_json_atomic<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| MigrateError::Io {
                message: format!("Failed to create directory {}", parent.display()),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }
    }

    let temp_path = path.with_extension(format!("json.{}.tmp", process::id()));

    let serialized = serde_json::to_string_pretty(data).map_err(|e| MigrateError::Json {
        message: format!("Failed to serialize data: {}", e),
        source: Some(e),
    })?;

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| MigrateError::Io {
                message: format!("Failed to create temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            })?;

        file.write_all(serialized.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| MigrateError::Io {
                message: format!("Failed to write temp file {}", temp_path.display()),
                path: Some(temp_path.clone()),
                source: Some(e),
            })?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        MigrateError::Io {
            message: format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            ),
            path: Some(path.to_path_buf()),
            source: Some(e),
        }
    })?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_mapping() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("id_mapping.json");

        let mut mapping = BTreeMap::new();
        mapping.insert("1".to_string(), 42i64);
        mapping.insert("7".to_string(), 43i64);

        write_json_atomic(&path, &mapping).unwrap();
        let read: BTreeMap<String, i64> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, mapping);

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_overwrite_replaces_previous_mapping() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("id_mapping.json");

        let mut mapping = BTreeMap::new();
        mapping.insert("1".to_string(), 42i64);
        write_json_atomic(&path, &mapping).unwrap();

        mapping.clear();
        mapping.insert("2".to_string(), 7i64);
        write_json_atomic(&path, &mapping).unwrap();

        let read: BTreeMap<String, i64> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, mapping);
    }

    #[test]
    fn test_write_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out/run1/id_mapping.json");

        write_json_atomic(&path, &BTreeMap::<String, i64>::new()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }
}
