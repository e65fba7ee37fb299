//! Target CMS REST API.
//!
//! The migration only talks to the API through [`CmsApi`], so every pipeline
//! stage can run against an in-memory implementation in tests. [`CmsClient`]
//! is the HTTP implementation.

mod client;
mod types;

pub use client::{CmsClient, Credentials};
pub use types::{AssetWrite, NewVersion, PageStatus, TranslationPayload};

use crate::error::Result;
use async_trait::async_trait;

/// Operations of the target CMS used by the migration.
#[async_trait]
pub trait CmsApi: Send + Sync {
    /// Create a page. Returns its id if the response carried one.
    async fn create_page(&self, slug: &str) -> Result<Option<i64>>;

    /// Look up an existing page by slug.
    async fn find_page_by_slug(&self, slug: &str) -> Result<Option<i64>>;

    /// Create a version holding all translations of a page.
    /// Returns the version number if the response carried one.
    async fn create_version(&self, page_id: i64, version: &NewVersion) -> Result<Option<i64>>;

    /// Create an asset directory. A conflict means it already exists.
    async fn create_asset_directory(&self, path: &str) -> Result<AssetWrite>;

    /// Store raw file bytes at an asset path. A conflict means it already exists.
    async fn upload_asset(&self, path: &str, bytes: Vec<u8>) -> Result<AssetWrite>;
}
