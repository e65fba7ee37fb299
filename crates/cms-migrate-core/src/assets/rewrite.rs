//! Rewrite legacy asset URLs to the target CMS address form.

use crate::assets::index::FileIndex;
use crate::assets::reference::{LegacyIdentifier, ASSET_REFERENCE};
use crate::error::{MigrateError, Result};
use regex::Captures;
use tracing::{debug, warn};

/// Marker the target CMS expands to its asset base URL.
pub const ASSET_URL_MARKER: &str = "$assets$";

/// Canonical address of an asset: `$assets$/{prefix}/{identifier}{extension}`.
pub fn canonical_address(prefix: &str, identifier: &LegacyIdentifier, extension: &str) -> String {
    format!("{}/{}/{}{}", ASSET_URL_MARKER, prefix, identifier, extension)
}

/// Reject asset prefixes whose canonical addresses would look like legacy
/// references again, e.g. `cms/assets`. Rewriting must stay idempotent.
pub fn validate_asset_prefix(prefix: &str) -> Result<()> {
    if prefix.trim_matches('/').is_empty() {
        return Err(MigrateError::Config {
            message: "Asset prefix must not be empty".to_string(),
        });
    }

    // Any legacy match inside a canonical address needs `cms/assets/` from the prefix.
    let sample = format!("{}/{}/", ASSET_URL_MARKER, prefix).to_ascii_lowercase();
    if sample.contains("cms/assets/") || ASSET_REFERENCE.is_match(&sample) {
        return Err(MigrateError::Config {
            message: format!(
                "Asset prefix {} would produce addresses matching legacy asset URLs",
                prefix
            ),
        });
    }

    Ok(())
}

/// Replace every legacy asset reference that resolves in `index`.
///
/// The whole match (path prefix, identifier and query string) is replaced.
/// References without an indexed file are kept verbatim. The canonical form
/// doesn't match the legacy pattern, so rewriting twice changes nothing.
pub fn rewrite_references(content: &str, index: &FileIndex, prefix: &str) -> String {
    ASSET_REFERENCE
        .replace_all(content, |caps: &Captures<'_>| {
            let matched = &caps[0];
            let Some(identifier) = LegacyIdentifier::parse(&caps[1]) else {
                return matched.to_string();
            };

            match index.get(&identifier) {
                Some(record) => {
                    let address = canonical_address(prefix, &identifier, &record.extension);
                    debug!("Rewrote {} -> {}", matched, address);
                    address
                }
                None => {
                    warn!("No attachment file for {}, keeping {}", identifier, matched);
                    matched.to_string()
                }
            }
        })
        .into_owned()
}
