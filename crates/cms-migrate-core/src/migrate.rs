//! Page and version orchestration.
//!
//! Everything runs sequentially: one page, one translation and one asset at a
//! time, each remote call awaited before the next. Per-item failures are
//! logged and counted; only a missing page list and a failed login abort.

use crate::api::{CmsApi, CmsClient, Credentials, NewVersion, PageStatus, TranslationPayload};
use crate::assets::{
    build_file_index, extract_references, rewrite_references, validate_asset_prefix,
    AssetUploader, FileIndex, UploadLedger,
};
use crate::config::{CmsApiConfig, ExportConfig};
use crate::content::{extract_title, normalize_language_code};
use crate::error::Result;
use crate::export::{LegacyId, LegacyPage, LegacyTranslation, MigrationInput};
use crate::persist::write_json_atomic;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Immutable options of one migration run.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub base_url: String,
    pub credentials: Credentials,
    /// Directory holding the export files and the `files/` attachment folder.
    pub data_dir: PathBuf,
    pub dry_run: bool,
    pub skip_assets: bool,
    pub asset_prefix: String,
    pub slug_prefix: String,
    /// Defaults to `<data_dir>/id_mapping.json`.
    pub mapping_file: Option<PathBuf>,
}

impl MigrationSettings {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            data_dir: data_dir.into(),
            dry_run: false,
            skip_assets: false,
            asset_prefix: CmsApiConfig::DEFAULT_ASSET_PREFIX.to_string(),
            slug_prefix: CmsApiConfig::DEFAULT_SLUG_PREFIX.to_string(),
            mapping_file: None,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_skip_assets(mut self, skip_assets: bool) -> Self {
        self.skip_assets = skip_assets;
        self
    }

    pub fn with_asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.asset_prefix = prefix.into();
        self
    }

    pub fn with_slug_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.slug_prefix = prefix.into();
        self
    }

    pub fn with_mapping_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.mapping_file = Some(path.into());
        self
    }

    /// Reject settings the run can't honor. The asset prefix only matters
    /// when assets are migrated.
    pub fn validate(&self) -> Result<()> {
        if !self.skip_assets {
            validate_asset_prefix(&self.asset_prefix)?;
        }
        Ok(())
    }

    pub fn files_dir(&self) -> PathBuf {
        self.data_dir.join(ExportConfig::FILES_DIR_NAME)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.mapping_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(ExportConfig::ID_MAPPING_FILENAME))
    }
}

/// Mutable state threaded through one run.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub ledger: UploadLedger,
    /// Old page id -> new page id.
    pub id_mapping: BTreeMap<String, i64>,
    pub pages_succeeded: usize,
    pub pages_failed: usize,
    /// Upload calls that left the asset available on the target.
    pub asset_references: usize,
    /// Upload calls that ended in `NotFound` or `TransferFailed`.
    pub asset_failures: usize,
    pub translations_skipped: usize,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> MigrationSummary {
        MigrationSummary {
            pages_succeeded: self.pages_succeeded,
            pages_failed: self.pages_failed,
            assets_uploaded: self.ledger.len(),
            asset_references: self.asset_references,
            asset_failures: self.asset_failures,
            translations_skipped: self.translations_skipped,
            id_mapping: self.id_mapping.clone(),
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub pages_succeeded: usize,
    pub pages_failed: usize,
    /// Distinct assets confirmed on the target.
    pub assets_uploaded: usize,
    pub asset_references: usize,
    pub asset_failures: usize,
    pub translations_skipped: usize,
    pub id_mapping: BTreeMap<String, i64>,
}

impl MigrationSummary {
    /// No page failed.
    pub fn is_success(&self) -> bool {
        self.pages_failed == 0
    }

    pub fn log(&self, assets_enabled: bool) {
        info!("Migration finished");
        info!("Pages migrated: {}", self.pages_succeeded);
        if assets_enabled {
            info!("Assets uploaded: {}", self.assets_uploaded);
        }
        if self.asset_failures > 0 {
            warn!("Asset failures: {}", self.asset_failures);
        }
        if self.translations_skipped > 0 {
            warn!("Translations skipped: {}", self.translations_skipped);
        }
        if self.pages_failed > 0 {
            error!("Pages failed: {}", self.pages_failed);
        }
    }
}

/// Drives pages through page creation, asset handling and version creation.
pub struct Migrator<'a, A: CmsApi + ?Sized> {
    settings: &'a MigrationSettings,
    api: &'a A,
    index: &'a FileIndex,
}

impl<'a, A: CmsApi + ?Sized> Migrator<'a, A> {
    pub fn new(settings: &'a MigrationSettings, api: &'a A, index: &'a FileIndex) -> Self {
        Self {
            settings,
            api,
            index,
        }
    }

    fn assets_enabled(&self) -> bool {
        !self.settings.skip_assets && !self.index.is_empty()
    }

    /// Migrate every page of `input`, recording results in `state`.
    pub async fn migrate(&self, input: &MigrationInput, state: &mut RunState) -> MigrationSummary {
        if self.settings.dry_run {
            warn!("Dry-run mode: no changes will be made");
        }

        if self.assets_enabled() {
            let prefix = &self.settings.asset_prefix;
            info!("Creating asset directory {}", prefix);
            if let Err(e) = self.api.create_asset_directory(prefix).await {
                error!("Failed to create asset directory {}: {}", prefix, e);
            }
        }

        let translations_by_page = input.translations_by_page();

        for page in &input.pages {
            let Some(page_id) = &page.id else {
                error!(
                    "Skipping page without id (slug {})",
                    page.slug.as_deref().unwrap_or("<none>")
                );
                state.pages_failed += 1;
                continue;
            };
            let translations = translations_by_page
                .get(page_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            self.migrate_page(page_id, page, translations, state).await;
        }

        state.summary()
    }

    async fn migrate_page(
        &self,
        page_id: &LegacyId,
        page: &LegacyPage,
        translations: &[LegacyTranslation],
        state: &mut RunState,
    ) {
        let slug = format!(
            "{}{}",
            self.settings.slug_prefix,
            page.slug.as_deref().unwrap_or_default()
        );
        info!(
            "Processing page {}: {} (project: {})",
            page_id,
            slug,
            page.project.as_deref().unwrap_or("default")
        );

        let Some(new_id) = self.resolve_page_id(&slug).await else {
            error!("Skipping page {}", page_id);
            state.pages_failed += 1;
            return;
        };

        state.id_mapping.insert(page_id.to_string(), new_id);

        if translations.is_empty() {
            warn!("No translations for page {}", page_id);
            state.pages_succeeded += 1;
            return;
        }

        let fallback_title = format!("Page {}", page_id);
        let mut payloads = Vec::with_capacity(translations.len());
        for translation in translations {
            if let Some(payload) = self
                .transform_translation(translation, &fallback_title, state)
                .await
            {
                payloads.push(payload);
            }
        }

        if payloads.is_empty() {
            warn!("No valid translations for page {}", page_id);
            state.pages_succeeded += 1;
            return;
        }

        let status = PageStatus::from_legacy(page.status.as_deref().unwrap_or("draft"));
        let version = NewVersion {
            status,
            comment: CmsApiConfig::VERSION_COMMENT.to_string(),
            translations: payloads,
        };

        info!("Creating version for page {} (status {})", new_id, status.as_str());
        match self.api.create_version(new_id, &version).await {
            Ok(number) => {
                match number {
                    Some(n) => info!("Created version {} of page {}", n, new_id),
                    None => info!("Created version of page {}", new_id),
                }
                state.pages_succeeded += 1;
            }
            Err(e) => {
                error!("Failed to create version for page {}: {}", new_id, e);
                state.pages_failed += 1;
            }
        }
    }

    /// Create the page, falling back to a slug lookup when the response has no id.
    async fn resolve_page_id(&self, slug: &str) -> Option<i64> {
        info!("Creating page {}", slug);
        let created = match self.api.create_page(slug).await {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to create page {}: {}", slug, e);
                return None;
            }
        };

        let id = match created {
            Some(id) => Some(id),
            None => {
                warn!("No id in create response, looking up {}", slug);
                match self.api.find_page_by_slug(slug).await {
                    Ok(id) => id,
                    Err(e) => {
                        error!("Lookup of {} failed: {}", slug, e);
                        None
                    }
                }
            }
        };

        match id {
            Some(id) => info!("Page created with id {}", id),
            None => error!("No page id received for {}", slug),
        }
        id
    }

    /// Convert one legacy translation: upload its assets, rewrite references,
    /// derive a title. Returns `None` when it has no language code.
    pub async fn transform_translation(
        &self,
        translation: &LegacyTranslation,
        fallback_title: &str,
        state: &mut RunState,
    ) -> Option<TranslationPayload> {
        let Some(code) = translation.languages_code.as_deref().filter(|c| !c.is_empty()) else {
            warn!("Skipping translation without language code");
            state.translations_skipped += 1;
            return None;
        };

        let language = normalize_language_code(code);
        let mut content = translation.content.clone().unwrap_or_default();

        if self.assets_enabled() {
            let identifiers = extract_references(&content);
            if !identifiers.is_empty() {
                info!(
                    "Found {} assets in {} translation",
                    identifiers.len(),
                    language
                );

                let uploader = AssetUploader::new(self.api, self.index, self.settings.dry_run);
                for identifier in &identifiers {
                    let outcome = uploader
                        .upload_asset(&mut state.ledger, identifier, &self.settings.asset_prefix)
                        .await;
                    if outcome.is_available() {
                        state.asset_references += 1;
                    } else {
                        state.asset_failures += 1;
                    }
                }

                content = rewrite_references(&content, self.index, &self.settings.asset_prefix);
            }
        }

        let title = extract_title(&content, fallback_title);
        debug!("Language {}, title {}", language, title);

        Some(TranslationPayload {
            language,
            title,
            content,
        })
    }
}

/// Run a complete migration as configured by `settings`.
///
/// Validates the settings, builds the attachment index, loads the export,
/// logs in, migrates every page and persists the id mapping. Errors are
/// returned only for the fatal cases: invalid settings, unreadable page list,
/// failed login, unwritable mapping file.
pub async fn run_migration(settings: &MigrationSettings) -> Result<MigrationSummary> {
    info!("Starting CMS migration");
    info!("Data directory: {}", settings.data_dir.display());
    info!("API endpoint: {}", settings.base_url);

    settings.validate()?;

    let index = if settings.skip_assets {
        FileIndex::new()
    } else {
        info!("Building attachment index");
        build_file_index(&settings.files_dir())?
    };

    let input = MigrationInput::load(&settings.data_dir)?;

    let client =
        CmsClient::login(&settings.base_url, &settings.credentials, settings.dry_run).await?;

    let mut state = RunState::new();
    let summary = Migrator::new(settings, &client, &index)
        .migrate(&input, &mut state)
        .await;

    summary.log(!settings.skip_assets);

    let mapping_path = settings.mapping_path();
    write_json_atomic(&mapping_path, &summary.id_mapping)?;
    info!("Id mapping saved to {}", mapping_path.display());

    Ok(summary)
}
