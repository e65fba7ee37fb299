//! Lookup from legacy identifier to the attachment file on disk.
//!
//! The export stores attachments as `<uuid>_splitme_<original name>.<ext>`.
//! Only the leading identifier and the extension matter for the migration.

use crate::assets::reference::LegacyIdentifier;
use crate::error::{MigrateError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One attachment file found in the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub identifier: LegacyIdentifier,
    /// File name as found in the export directory.
    pub original_filename: String,
    /// Suffix including the leading dot, or empty.
    pub extension: String,
    pub storage_location: PathBuf,
}

impl FileRecord {
    /// Build a record from a file name, or `None` if it doesn't start with an identifier.
    pub fn from_path(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?;
        let identifier = LegacyIdentifier::parse_prefix(filename)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        Some(Self {
            identifier,
            original_filename: filename.to_string(),
            extension,
            storage_location: path.to_path_buf(),
        })
    }

    /// Target path of this file inside the asset folder `prefix`.
    pub fn target_path(&self, prefix: &str) -> String {
        format!("{}/{}{}", prefix, self.identifier, self.extension)
    }
}

/// Read-only index of the attachment directory for one run.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    records: HashMap<LegacyIdentifier, FileRecord>,
}

impl FileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, replacing any earlier one with the same identifier.
    pub fn insert(&mut self, record: FileRecord) -> Option<FileRecord> {
        self.records.insert(record.identifier.clone(), record)
    }

    pub fn get(&self, identifier: &LegacyIdentifier) -> Option<&FileRecord> {
        self.records.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<FileRecord> for FileIndex {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut index = FileIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

/// Scan `dir` once and index every file whose name starts with an identifier.
///
/// A missing directory yields an empty index; the migration then runs with
/// every reference unresolved. Entries are visited in file name order, so when
/// two files share an identifier the lexicographically last one wins.
pub fn build_file_index(dir: &Path) -> Result<FileIndex> {
    let mut index = FileIndex::new();

    if !dir.exists() {
        warn!("Attachment directory not found: {}", dir.display());
        return Ok(index);
    }

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            match e.into_io_error() {
                Some(io) => MigrateError::io_with_path(io, path),
                None => MigrateError::Io {
                    message: "Directory loop while scanning attachments".to_string(),
                    path: Some(path),
                    source: None,
                },
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        match FileRecord::from_path(entry.path()) {
            Some(record) => {
                debug!(
                    "Indexed {} -> {}",
                    record.identifier, record.original_filename
                );
                if let Some(previous) = index.insert(record) {
                    warn!(
                        "Duplicate attachment for {}, replacing {}",
                        previous.identifier, previous.original_filename
                    );
                }
            }
            None => debug!("Skipping {}: no leading identifier", entry.path().display()),
        }
    }

    info!("{} attachment files indexed", index.len());
    Ok(index)
}
