use std::sync::LazyLock;

use regex::Regex;

static IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src="([^">]+)""#).unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Extract inline image URLs from an HTML body, in order of first
/// appearance. Duplicates are kept; the storage layer deduplicates.
pub fn extract_image_urls(html: &str) -> Vec<String> {
    IMG_SRC
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Decode HTML entities ("&amp;" -> "&", "&#8217;" -> "'").
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Reduce an HTML body to plain text: tags removed, whitespace
/// collapsed to single spaces, trimmed. Entities are left as-is.
pub fn plain_text(html: &str) -> String {
    let stripped = TAG.replace_all(html, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
