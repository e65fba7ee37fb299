//! Locale tag normalization.

/// Locale tags with a fixed two-letter mapping.
const LANGUAGE_MAP: &[(&str, &str)] = &[("de-DE", "de"), ("en-US", "en"), ("fr-FR", "fr")];

/// Convert a legacy locale tag (`de-DE`) to the target's language code (`de`).
///
/// Known tags use the fixed table; anything else is cut at the first `-`.
pub fn normalize_language_code(code: &str) -> String {
    LANGUAGE_MAP
        .iter()
        .find(|(tag, _)| *tag == code)
        .map(|(_, short)| short.to_string())
        .unwrap_or_else(|| code.split('-').next().unwrap_or(code).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_tags() {
        assert_eq!(normalize_language_code("de-DE"), "de");
        assert_eq!(normalize_language_code("en-US"), "en");
        assert_eq!(normalize_language_code("fr-FR"), "fr");
    }

    #[test]
    fn test_unmapped_tags_are_truncated() {
        assert_eq!(normalize_language_code("pt-BR"), "pt");
        assert_eq!(normalize_language_code("en-GB"), "en");
        assert_eq!(normalize_language_code("it"), "it");
    }
}
