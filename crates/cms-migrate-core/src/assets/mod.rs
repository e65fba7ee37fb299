//! Asset reference pipeline.
//!
//! ```text
//! content ──► extract_references ──► AssetUploader (UploadLedger) ──► rewrite_references
//!                                          │                               │
//!                                          └────────── FileIndex ──────────┘
//! ```
//!
//! The [`FileIndex`] is built once per run from the attachment directory.
//! Each translation's content is scanned for legacy identifiers, every
//! identifier is uploaded at most once per run, and the references are
//! rewritten to `$assets$/{prefix}/{identifier}{extension}`.

mod index;
mod reference;
mod rewrite;
mod uploader;

pub use index::{build_file_index, FileIndex, FileRecord};
pub use reference::{extract_references, LegacyIdentifier};
pub use rewrite::{
    canonical_address, rewrite_references, validate_asset_prefix, ASSET_URL_MARKER,
};
pub use uploader::{AssetUploader, UploadLedger, UploadOutcome};

#[cfg(test)]
pub(crate) use uploader::tests::FakeCms;
