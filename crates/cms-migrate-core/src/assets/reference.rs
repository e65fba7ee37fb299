//! Legacy attachment identifiers and the references that embed them in content.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

/// Identifier anchored at both ends.
static IDENTIFIER_EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

/// Identifier at the start of a longer string (attachment file names).
static IDENTIFIER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})").unwrap()
});

/// Legacy asset URL inside HTML content.
///
/// Matches `../../cms/assets/<id>`, `/cms/assets/<id>` and `cms/assets/<id>`,
/// each with an optional query string that runs up to a quote or whitespace.
/// Group 1 is the identifier.
pub(crate) static ASSET_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?:\.\./)*/?cms/assets/([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})(?:\?[^"'\s]*)?"#,
    )
    .unwrap()
});

/// Canonical lowercase identifier of one legacy attachment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyIdentifier(String);

impl LegacyIdentifier {
    /// Parse a string that is exactly one identifier, in any case.
    pub fn parse(value: &str) -> Option<Self> {
        if IDENTIFIER_EXACT.is_match(value) {
            Some(Self(value.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Parse the identifier a string starts with, ignoring whatever follows.
    pub fn parse_prefix(value: &str) -> Option<Self> {
        IDENTIFIER_PREFIX
            .captures(value)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LegacyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collect the distinct identifiers referenced by `content`.
///
/// Every call walks its own match iterator over the shared compiled pattern,
/// so calls never influence each other.
pub fn extract_references(content: &str) -> BTreeSet<LegacyIdentifier> {
    if content.is_empty() {
        return BTreeSet::new();
    }

    ASSET_REFERENCE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| LegacyIdentifier(m.as_str().to_ascii_lowercase()))
        .collect()
}
