/*!
 * Markdown link detection.
 *
 * Links are found with a single-line `[text](target)` pattern. This is a
 * heuristic, not a markdown parser: nested brackets (badges wrapped in links)
 * or parentheses inside targets are matched approximately. It is applied the
 * same way to source and translation, so parity checks stay meaningful.
 */

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for matching inline markdown links (images included)
static LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]\n]*)\]\(([^)\n]*)\)").expect("Invalid markdown link regex")
});

/// Regex for a URL scheme prefix such as `https:` or `mailto:`
static SCHEME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("Invalid scheme regex"));

/// One `[text](target)` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
    /// Anchor text between the brackets
    pub text: String,
    /// Target between the parentheses
    pub target: String,
    /// Byte span of the whole link in the scanned text
    pub span: Range<usize>,
}

/// Extract all links of a text, in order.
pub fn extract_links(text: &str) -> Vec<MarkdownLink> {
    LINK_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(MarkdownLink {
                text: caps[1].to_string(),
                target: caps[2].to_string(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Count link patterns in a text.
pub fn count_links(text: &str) -> usize {
    LINK_REGEX.find_iter(text).count()
}

/// Relative paths are local; URLs, fragments and site-absolute paths are not.
pub fn is_local_target(target: &str) -> bool {
    let target = target.trim();
    !(target.is_empty()
        || target.starts_with('#')
        || target.starts_with('/')
        || SCHEME_REGEX.is_match(target))
}
