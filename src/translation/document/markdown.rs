/*!
 * Conversion between markdown text and the section model.
 *
 * Parsing is line based: an ATX heading (`#` to `######` followed by a space)
 * opens a new section, every other line is appended verbatim to the current
 * one. Lines inside fenced code blocks never open a section.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{Document, Section};

/// Regex for matching heading lines
static HEADING_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6}) (.*)$").expect("Invalid heading regex"));

/// Parse markdown text into a document.
///
/// The result always starts with a level-0 preamble, empty when the text
/// starts with a heading.
pub fn parse(text: &str) -> Document {
    let mut sections = vec![Section::preamble(String::new())];
    let mut fence: Option<(char, usize)> = None;

    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches('\n').trim_end_matches('\r');

        if let Some(marker) = fence_marker(bare) {
            fence = match fence {
                None => Some(marker),
                Some((ch, len)) if marker.0 == ch && marker.1 >= len => None,
                open => open,
            };
        } else if fence.is_none() {
            if let Some(caps) = HEADING_REGEX.captures(bare) {
                let level = caps[1].len() as u8;
                sections.push(Section::new(&caps[2], level, String::new()));
                continue;
            }
        }

        if let Some(current) = sections.last_mut() {
            current.content.push_str(line);
        }
    }

    Document::from_sections(sections)
}

/// Render a document, either as the source text or for a language.
///
/// With a language code, sections lacking a translation for it are skipped.
pub fn render(doc: &Document, language_code: Option<&str>) -> String {
    render_sections(doc.sections.iter(), language_code)
}

/// Render an arbitrary run of sections.
pub fn render_sections<'a>(
    sections: impl IntoIterator<Item = &'a Section>,
    language_code: Option<&str>,
) -> String {
    let mut out = String::new();

    for section in sections {
        let (title, content) = match language_code {
            None => (section.title.as_str(), section.content.as_str()),
            Some(code) => match section.translation(code) {
                Some(t) => (t.title.as_str(), t.content.as_str()),
                None => continue,
            },
        };

        if !section.is_preamble() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&"#".repeat(section.level as usize));
            out.push(' ');
            out.push_str(title.trim_end_matches(['\r', '\n']));
            out.push('\n');
        }
        out.push_str(content);
    }

    out
}

/// Opening/closing code fence marker of a line: fence char and run length.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    // Four spaces of indentation make an indented code block, not a fence
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let ch = trimmed.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let run = trimmed.chars().take_while(|c| *c == ch).count();
    (run >= 3).then_some((ch, run))
}
