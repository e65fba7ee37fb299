//! CMS Migrate Core - migrates a legacy CMS export into the new CMS REST API.
//!
//! Reads the Directus-style JSON export (`Page.json`, `Page_translations.json`,
//! `languages.json`) and the `files/` attachment directory, recreates every
//! page with one version holding all its translations, uploads the referenced
//! attachments once each and rewrites their URLs to the `$assets$` form.
//!
//! # Example
//!
//! ```rust,ignore
//! use cms_migrate_core::{run_migration, Credentials, MigrationSettings};
//!
//! #[tokio::main]
//! async fn main() -> cms_migrate_core::Result<()> {
//!     let settings = MigrationSettings::new(
//!         "http://localhost:8291/mir",
//!         Credentials::new("administrator", "secret"),
//!         "./old",
//!     )
//!     .with_dry_run(true);
//!
//!     let summary = run_migration(&settings).await?;
//!     println!("{} pages migrated", summary.pages_succeeded);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assets;
pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod migrate;
pub mod persist;

// Re-export commonly used types
pub use api::{AssetWrite, CmsApi, CmsClient, Credentials, NewVersion, PageStatus};
pub use assets::{
    build_file_index, extract_references, rewrite_references, AssetUploader, FileIndex,
    FileRecord, LegacyIdentifier, UploadLedger, UploadOutcome,
};
pub use config::{CmsApiConfig, ExportConfig};
pub use error::{MigrateError, Result};
pub use export::{LegacyId, LegacyPage, LegacyTranslation, MigrationInput};
pub use migrate::{run_migration, MigrationSettings, MigrationSummary, Migrator, RunState};
