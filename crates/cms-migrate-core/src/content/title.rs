//! Page titles derived from translated HTML content.

use regex::Regex;
use std::sync::LazyLock;

/// Heading patterns in priority order. Inner text must not contain tags.
static HEADINGS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)<h1[^>]*>([^<]+)</h1>").unwrap(),
        Regex::new(r"(?i)<h2[^>]*>([^<]+)</h2>").unwrap(),
        Regex::new(r"(?i)<h3[^>]*>([^<]+)</h3>").unwrap(),
    ]
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&ndash;", "\u{2013}"),
    ("&mdash;", "\u{2014}"),
    ("&laquo;", "\u{ab}"),
    ("&raquo;", "\u{bb}"),
    ("&ldquo;", "\u{201c}"),
    ("&rdquo;", "\u{201d}"),
    ("&lsquo;", "\u{2018}"),
    ("&rsquo;", "\u{2019}"),
    ("&szlig;", "\u{df}"),
    ("&auml;", "\u{e4}"),
    ("&ouml;", "\u{f6}"),
    ("&uuml;", "\u{fc}"),
    ("&Auml;", "\u{c4}"),
    ("&Ouml;", "\u{d6}"),
    ("&Uuml;", "\u{dc}"),
    ("&eacute;", "\u{e9}"),
    ("&egrave;", "\u{e8}"),
    ("&agrave;", "\u{e0}"),
    ("&ccedil;", "\u{e7}"),
];

/// Title from the first `<h1>`, `<h2>` or `<h3>` in `content`, else `fallback`.
pub fn extract_title(content: &str, fallback: &str) -> String {
    if content.is_empty() {
        return fallback.to_string();
    }

    for pattern in HEADINGS.iter() {
        if let Some(caps) = pattern.captures(content) {
            let decoded = decode_html_entities(caps[1].trim());
            return TAG.replace_all(&decoded, "").into_owned();
        }
    }

    fallback.to_string()
}

/// Decode the named entities common in the legacy content and decimal `&#NN;` ones.
///
/// Named entities are replaced in table order, so `&amp;lt;` decodes to `<`.
pub fn decode_html_entities(text: &str) -> String {
    let mut result = text.to_string();
    for (entity, ch) in NAMED_ENTITIES {
        result = result.replace(entity, ch);
    }

    NUMERIC_ENTITY
        .replace_all(&result, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_heading_by_level() {
        let content = "<h2>Second</h2><p>x</p><H1 class=\"big\"> Main </H1>";
        assert_eq!(extract_title(content, "fallback"), "Main");

        let content = "<p>intro</p><h3>Three</h3><h2>Two</h2>";
        assert_eq!(extract_title(content, "fallback"), "Two");
    }

    #[test]
    fn test_fallback_without_heading() {
        assert_eq!(extract_title("", "Page 7"), "Page 7");
        assert_eq!(extract_title("<p>Body only</p>", "Page 7"), "Page 7");
        // Nested markup inside the heading doesn't count as plain text.
        assert_eq!(extract_title("<h1><span>x</span></h1>", "Page 7"), "Page 7");
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(
            extract_title("<h1>Stra&szlig;e &amp; Gr&uuml;n&#33;</h1>", ""),
            "Stra\u{df}e & Gr\u{fc}n!"
        );
    }

    #[test]
    fn test_decoded_tags_are_stripped() {
        assert_eq!(extract_title("<h1>&lt;b&gt;Bold&lt;/b&gt; title</h1>", ""), "Bold title");
    }

    #[test]
    fn test_invalid_numeric_entity_is_kept() {
        assert_eq!(decode_html_entities("&#99999999999;"), "&#99999999999;");
        assert_eq!(decode_html_entities("&#8364;"), "\u{20ac}");
    }
}
