//! Block-content sanitization.
//!
//! An ordered list of pure `&str -> String` transforms applied in a fixed
//! sequence by [`clean_block_content`]. Marker and priority removal run
//! before the line-based passes so a stray token embedded mid-line is not
//! reinterpreted by them.

use regex::Regex;
use std::sync::LazyLock;

static ASSET_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(\.\./assets/[^)]*\)").unwrap());
static PROPERTY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[A-Za-z0-9_.-]+:: .*\n?").unwrap());
static RENDERER_MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{renderer .*?\}\}").unwrap());
static ANNOTATION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^[ \t]*(?:deadline|scheduled):.*\n?").unwrap());
static LOGBOOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is):LOGBOOK:.*?:END:[ \t]*\n?").unwrap());
static SEARCH_HIGHLIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$pfts_2lqh>\$(.*?)\$<pfts_2lqh\$").unwrap());
static EMPTY_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*-[ \t]*$\n?").unwrap());

/// Remove the workflow marker token, once, by exact substring.
pub fn strip_marker(content: &str, marker: Option<&str>) -> String {
    match marker {
        Some(marker) if !marker.is_empty() => content.replacen(marker, "", 1),
        _ => content.to_string(),
    }
}

/// Remove the `[#A]`-style priority tag, once.
pub fn strip_priority(content: &str, priority: Option<&str>) -> String {
    match priority {
        Some(priority) if !priority.is_empty() => {
            content.replacen(&format!("[#{}]", priority), "", 1)
        }
        _ => content.to_string(),
    }
}

/// Remove embedded images that point into the graph's local assets.
pub fn strip_asset_images(content: &str) -> String {
    ASSET_IMAGE.replace_all(content, "").into_owned()
}

/// Remove `key:: value` property lines.
pub fn strip_property_lines(content: &str) -> String {
    PROPERTY_LINE.replace_all(content, "").into_owned()
}

/// Remove `{{renderer ...}}` macro calls.
pub fn strip_renderer_macros(content: &str) -> String {
    RENDERER_MACRO.replace_all(content, "").into_owned()
}

/// Remove `DEADLINE:` / `SCHEDULED:` annotation lines.
pub fn strip_annotation_lines(content: &str) -> String {
    ANNOTATION_LINE.replace_all(content, "").into_owned()
}

/// Remove `:LOGBOOK: ... :END:` sections, case-insensitively.
pub fn strip_logbook(content: &str) -> String {
    LOGBOOK.replace_all(content, "").into_owned()
}

/// Convert Logseq's internal full-text-search highlight markup to `<em>`.
pub fn convert_search_highlights(content: &str) -> String {
    SEARCH_HIGHLIGHT
        .replace_all(content, "<em>$1</em>")
        .into_owned()
}

/// Remove lines that consist of a bare bullet and nothing else.
pub fn strip_empty_bullets(content: &str) -> String {
    EMPTY_BULLET.replace_all(content, "").into_owned()
}

/// The full sanitization pipeline, in its fixed order.
pub fn clean_block_content(content: &str, marker: Option<&str>, priority: Option<&str>) -> String {
    let text = strip_marker(content, marker);
    let text = strip_priority(&text, priority);
    let text = strip_asset_images(&text);
    let text = strip_property_lines(&text);
    let text = strip_renderer_macros(&text);
    let text = strip_annotation_lines(&text);
    let text = strip_logbook(&text);
    let text = convert_search_highlights(&text);
    let text = strip_empty_bullets(&text);
    text.trim().to_string()
}
