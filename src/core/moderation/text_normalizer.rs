//! Canonical form for field values and terms.
//!
//! Both sides of a comparison pass through [`normalize`], so formatting and
//! punctuation tricks ("p.r.e.m.i.u.m", "<b>venda</b>") collapse to a bare
//! alphanumeric run that plain substring containment can catch.

use regex::Regex;
use std::sync::LazyLock;

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Normalize raw text for term matching.
///
/// Steps, in order: trim, strip markup tags, drop newlines and tabs,
/// Unicode lowercase, keep only ASCII lowercase letters and digits.
/// Accented letters therefore disappear rather than fold ("grátis" -> "grtis").
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let untagged = MARKUP_TAG.replace_all(trimmed, "");
    let flattened: String = untagged.chars().filter(|c| *c != '\n' && *c != '\t').collect();

    flattened
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Normalize an optional value; absent input yields an empty string.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_and_punctuation_collapse() {
        assert_eq!(normalize("<b>PREMIUM!</b>"), "premium");
        assert_eq!(normalize("p.r.e.m.i.u.m"), "premium");
        assert_eq!(normalize("  <i>Venda</i>\n\tagora  "), "vendaagora");
    }

    #[test]
    fn test_accented_letters_are_dropped() {
        assert_eq!(normalize("Grátis"), "grtis");
        assert_eq!(normalize("ÇÃ"), "");
        assert_eq!(normalize("ÇÃO"), "o");
    }

    #[test]
    fn test_empty_and_absent_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some("Apk")), "apk");
    }

    #[test]
    fn test_multiline_tags_are_stripped() {
        assert_eq!(normalize("<a\nhref='x'>install</a>"), "install");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let samples = [
            "download the APK now",
            "<p>Compre já!</p>",
            "v e n d o\tlivros\n",
            "1337 h4x <script>alert(1)</script>",
            "",
            "ÀÉÎÕÜ ñ ß",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in ".*") {
            let once = normalize(&raw);
            proptest::prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_output_is_ascii_alphanumeric(raw in ".*") {
            let out = normalize(&raw);
            proptest::prop_assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }
}
