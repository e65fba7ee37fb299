//! Centralized configuration for the migration.
//!
//! Fixed file names of the legacy export and the endpoint layout of the
//! target CMS API. Runtime options live in [`crate::MigrationSettings`].

/// Layout of the legacy export directory.
pub struct ExportConfig;

impl ExportConfig {
    pub const PAGES_FILENAME: &'static str = "Page.json";
    pub const TRANSLATIONS_FILENAME: &'static str = "Page_translations.json";
    pub const LANGUAGES_FILENAME: &'static str = "languages.json";
    pub const FILES_DIR_NAME: &'static str = "files";
    pub const ID_MAPPING_FILENAME: &'static str = "id_mapping.json";
    pub const DEFAULT_DATA_DIR: &'static str = "./old";
}

/// Target CMS API layout and defaults.
pub struct CmsApiConfig;

impl CmsApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8291/mir";
    pub const DEFAULT_USER: &'static str = "administrator";
    pub const AUTH_PATH: &'static str = "/api/v2/auth/login";
    pub const CMS_PATH: &'static str = "/api/cms/v1";
    pub const USER_AGENT: &'static str = concat!("cms-migrate/", env!("CARGO_PKG_VERSION"));

    /// Asset folder the attachments are uploaded into.
    pub const DEFAULT_ASSET_PREFIX: &'static str = "qed";
    /// Prepended to every legacy slug.
    pub const DEFAULT_SLUG_PREFIX: &'static str = "/qed";
    pub const VERSION_COMMENT: &'static str = "Imported from legacy CMS";
}
