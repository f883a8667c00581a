// src/formatting.rs

use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

/// Number of words kept when an excerpt is generated from post content.
pub const EXCERPT_WORDS: usize = 55;

/// Appended to a generated excerpt that was cut short.
pub const EXCERPT_MORE: &str = "&hellip;";

static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[/?[A-Za-z][\w-]*(?:\s[^\]]*)?/?\]").unwrap());

static SCRIPT_OR_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(?:script|style)[^>]*>.*?</(?:script|style)>").unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Removes `[shortcode]` markers, keeping any enclosed text.
pub fn strip_shortcodes(text: &str) -> String {
    SHORTCODE.replace_all(text, "").into_owned()
}

/// Removes HTML tags, dropping the contents of `<script>` and `<style>` blocks.
pub fn strip_tags(text: &str) -> String {
    let without_blocks = SCRIPT_OR_STYLE.replace_all(text, "");
    TAG.replace_all(&without_blocks, "").trim().to_string()
}

/// Keeps the first `limit` words of `text`, appending `more` when words were dropped.
///
/// Whitespace runs collapse to a single space.
pub fn trim_words(text: &str, limit: usize, more: &str) -> String {
    let stripped = strip_tags(text);
    let words: Vec<&str> = stripped.split_whitespace().collect();
    if words.len() > limit {
        format!("{}{}", words[..limit].iter().join(" "), more)
    } else {
        words.iter().join(" ")
    }
}

/// Builds a short plain-text summary of post content.
pub fn excerpt_from_content(content: &str) -> String {
    trim_words(&strip_shortcodes(content), EXCERPT_WORDS, EXCERPT_MORE)
}

/// Continues a Slack quote block across every line of `text`.
pub fn quote_lines(text: &str) -> String {
    text.replace('\n', "\n>")
}

/// Escapes text for use inside a Slack `<link|label>` construct.
pub fn escape_slack(text: &str) -> String {
    text.replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace("&nbsp;", " ")
        .replace("&laquo;", "<<")
        .replace("&raquo;", ">>")
}

/// Joins an admin-area base URL and a relative path.
pub fn admin_link(admin_url: &str, path: &str) -> String {
    format!("{}/{}", admin_url.trim_end_matches('/'), path)
}
