//! Legacy export records and their loading.
//!
//! The export consists of three JSON arrays in the data directory:
//! `Page.json`, `Page_translations.json` and `languages.json`. Only the page
//! list is mandatory.

use crate::config::ExportConfig;
use crate::error::{MigrateError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{error, info};

/// Legacy record id. The export uses numbers or strings; both become strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LegacyId(String);

impl LegacyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LegacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional id field. `null`, empty strings and other value types become
/// `None` so one broken record can't fail the whole file.
fn deserialize_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<LegacyId>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => Some(LegacyId(n.to_string())),
        serde_json::Value::String(s) if !s.is_empty() => Some(LegacyId(s)),
        _ => None,
    })
}

/// Entry of `Page.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPage {
    /// Records without an id are reported and skipped by the migrator.
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<LegacyId>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
}

/// Entry of `Page_translations.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyTranslation {
    #[serde(rename = "Page_id", default, deserialize_with = "deserialize_optional_id")]
    pub page_id: Option<LegacyId>,
    #[serde(default)]
    pub languages_code: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Entry of `languages.json`. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyLanguage {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Read and parse one export file.
pub fn read_export<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(MigrateError::FileNotFound(path.to_path_buf()));
    }

    let contents =
        std::fs::read_to_string(path).map_err(|e| MigrateError::io_with_path(e, path))?;

    serde_json::from_str(&contents).map_err(|e| MigrateError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })
}

/// Read an optional export file; failures are logged and yield an empty list.
fn read_optional_export<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match read_export(path) {
        Ok(items) => items,
        Err(e) => {
            error!("{}", e);
            Vec::new()
        }
    }
}

/// Everything read from the export directory.
#[derive(Debug, Clone, Default)]
pub struct MigrationInput {
    pub pages: Vec<LegacyPage>,
    pub translations: Vec<LegacyTranslation>,
    pub languages: Vec<LegacyLanguage>,
}

impl MigrationInput {
    /// Load the export files from `data_dir`.
    ///
    /// A missing or malformed page list is an error; the other two files are
    /// optional.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let pages: Vec<LegacyPage> =
            read_export(&data_dir.join(ExportConfig::PAGES_FILENAME))?;
        let translations =
            read_optional_export(&data_dir.join(ExportConfig::TRANSLATIONS_FILENAME));
        let languages = read_optional_export(&data_dir.join(ExportConfig::LANGUAGES_FILENAME));

        info!("Found {} pages", pages.len());
        info!("Found {} translations", translations.len());
        info!("Found {} languages", languages.len());

        Ok(Self {
            pages,
            translations,
            languages,
        })
    }

    /// Translations grouped by their page, see [`group_translations`].
    pub fn translations_by_page(&self) -> HashMap<LegacyId, Vec<LegacyTranslation>> {
        group_translations(&self.translations)
    }
}

/// Group translations by parent page, keeping export order within a page.
/// Translations without a page id are dropped.
pub fn group_translations(
    translations: &[LegacyTranslation],
) -> HashMap<LegacyId, Vec<LegacyTranslation>> {
    let mut groups: HashMap<LegacyId, Vec<LegacyTranslation>> = HashMap::new();
    for translation in translations {
        if let Some(page_id) = &translation.page_id {
            groups
                .entry(page_id.clone())
                .or_default()
                .push(translation.clone());
        }
    }
    groups
}
