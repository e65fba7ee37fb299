//! De-duplicated transfer of attachment files to the target CMS.

use crate::api::{AssetWrite, CmsApi};
use crate::assets::index::FileIndex;
use crate::assets::reference::LegacyIdentifier;
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

/// Identifiers confirmed present on the target during this run.
///
/// Only ever grows. Taking it by `&mut` in [`AssetUploader::upload_asset`]
/// keeps the check-then-upload sequence exclusive.
#[derive(Debug, Clone, Default)]
pub struct UploadLedger {
    confirmed: BTreeSet<LegacyIdentifier>,
}

impl UploadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &LegacyIdentifier) -> bool {
        self.confirmed.contains(identifier)
    }

    fn record(&mut self, identifier: &LegacyIdentifier) {
        self.confirmed.insert(identifier.clone());
    }

    pub fn len(&self) -> usize {
        self.confirmed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty()
    }
}

/// What happened to one upload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Transferred now (or recorded in dry-run).
    Uploaded,
    /// Already in the ledger, or the server reported a conflict.
    AlreadyPresent,
    /// No attachment file for the identifier.
    NotFound,
    /// Reading or sending the file failed. Not recorded in the ledger.
    TransferFailed,
}

impl UploadOutcome {
    /// The asset is available on the target after this call.
    pub fn is_available(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded | UploadOutcome::AlreadyPresent)
    }
}

/// Uploads indexed attachment files, at most one attempt per identifier per run.
pub struct AssetUploader<'a, A: CmsApi + ?Sized> {
    api: &'a A,
    index: &'a FileIndex,
    dry_run: bool,
}

impl<'a, A: CmsApi + ?Sized> AssetUploader<'a, A> {
    pub fn new(api: &'a A, index: &'a FileIndex, dry_run: bool) -> Self {
        Self {
            api,
            index,
            dry_run,
        }
    }

    /// Make sure the file for `identifier` exists at `prefix/identifier+extension`.
    pub async fn upload_asset(
        &self,
        ledger: &mut UploadLedger,
        identifier: &LegacyIdentifier,
        prefix: &str,
    ) -> UploadOutcome {
        let Some(record) = self.index.get(identifier) else {
            error!("No attachment file for identifier {}", identifier);
            return UploadOutcome::NotFound;
        };

        let target = record.target_path(prefix);

        if ledger.contains(identifier) {
            debug!("Asset already uploaded: {}", target);
            return UploadOutcome::AlreadyPresent;
        }

        if self.dry_run {
            warn!("[dry-run] Would upload {} -> {}", record.original_filename, target);
            ledger.record(identifier);
            return UploadOutcome::Uploaded;
        }

        info!("Uploading {} -> {}", record.original_filename, target);

        let bytes = match tokio::fs::read(&record.storage_location).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(
                    "Failed to read {}: {}",
                    record.storage_location.display(),
                    e
                );
                return UploadOutcome::TransferFailed;
            }
        };

        match self.api.upload_asset(&target, bytes).await {
            Ok(AssetWrite::Created) => {
                info!("Uploaded asset {}", target);
                ledger.record(identifier);
                UploadOutcome::Uploaded
            }
            Ok(AssetWrite::AlreadyExists) => {
                warn!("Asset already exists: {}", target);
                ledger.record(identifier);
                UploadOutcome::AlreadyPresent
            }
            Err(e) => {
                error!("Asset upload failed for {}: {}", target, e);
                UploadOutcome::TransferFailed
            }
        }
    }
}
