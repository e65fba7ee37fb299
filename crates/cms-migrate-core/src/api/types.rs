//! Request and response bodies of the target CMS API.

use serde::{Deserialize, Serialize};

/// Publication status of a page version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Published,
    Draft,
    Archived,
}

impl PageStatus {
    /// Map a legacy status string; unknown values become drafts.
    pub fn from_legacy(status: &str) -> Self {
        match status {
            "published" => PageStatus::Published,
            "archived" => PageStatus::Archived,
            _ => PageStatus::Draft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Published => "published",
            PageStatus::Draft => "draft",
            PageStatus::Archived => "archived",
        }
    }
}

/// One localized content entry of a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPayload {
    pub language: String,
    pub title: String,
    pub content: String,
}

/// Body of `POST /pages/{id}/versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVersion {
    pub status: PageStatus,
    pub comment: String,
    pub translations: Vec<TranslationPayload>,
}

/// Body of `POST /pages`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewPage<'a> {
    pub slug: &'a str,
}

/// Page as returned by create and lookup calls. Only the id is needed.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PageRef {
    #[serde(default)]
    pub id: Option<i64>,
}

/// Version as returned by create calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct VersionRef {
    #[serde(default)]
    pub version_number: Option<i64>,
}

/// Login response body, used when the token isn't in a header.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LoginBody {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Result of an idempotent asset write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetWrite {
    Created,
    /// The server answered 409: the path already exists.
    AlreadyExists,
}
