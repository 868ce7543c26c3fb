/*!
 * Link rewriting for translated output.
 *
 * Translated pages are published under `/<doc_dir>/<language_code>/`, so a
 * relative link copied from the source would point back into the original
 * language. Links of a translated body are paired by position with the links
 * of the source body: the target comes from the source (re-rooted when
 * local), the anchor text from the translation. A body whose link count
 * differs from its source is left untouched and flagged.
 */

use log::{debug, warn};

use crate::store::DocFile;
use crate::validation::links::{extract_links, is_local_target};
use super::document::{Document, Section};

/// Counts of a rewrite pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRewriteReport {
    /// Links rewritten
    pub rewritten: usize,
    /// Sections left untouched because their link counts differ
    pub flagged_sections: Vec<usize>,
}

impl LinkRewriteReport {
    pub fn has_link_errors(&self) -> bool {
        !self.flagged_sections.is_empty()
    }
}

/// Rewrites links of one language's translations
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    doc_dir: String,
    language_code: String,
}

impl LinkRewriter {
    pub fn new(doc_dir: &str, language_code: &str) -> Self {
        Self {
            doc_dir: doc_dir.trim_matches('/').to_string(),
            language_code: language_code.to_string(),
        }
    }

    /// Target used in the translated page.
    ///
    /// Local targets are prefixed with `/<doc_dir>/<language_code>/`, other
    /// targets are kept as they are.
    pub fn rewrite_target(&self, target: &str) -> String {
        if !is_local_target(target) {
            return target.to_string();
        }
        if self.doc_dir.is_empty() {
            format!("/{}/{}", self.language_code, target)
        } else {
            format!("/{}/{}/{}", self.doc_dir, self.language_code, target)
        }
    }

    /// Rewrite the translated body of one section.
    ///
    /// Returns the number of links rewritten, or `None` when the counts
    /// differ and the section was flagged instead.
    pub fn fix_section(&self, section: &mut Section) -> Option<usize> {
        let original = extract_links(&section.content);
        let translation = section.translation_mut(&self.language_code)?;
        let translated = extract_links(&translation.content);

        if original.len() != translated.len() {
            translation.likely_link_error = true;
            return None;
        }
        if translated.is_empty() {
            return Some(0);
        }

        let mut out = String::with_capacity(translation.content.len());
        let mut cursor = 0;
        for (source, target) in original.iter().zip(&translated) {
            out.push_str(&translation.content[cursor..target.span.start]);
            out.push('[');
            out.push_str(&target.text);
            out.push_str("](");
            out.push_str(&self.rewrite_target(&source.target));
            out.push(')');
            cursor = target.span.end;
        }
        out.push_str(&translation.content[cursor..]);
        translation.content = out;

        Some(translated.len())
    }

    /// Rewrite every translated section of a document.
    pub fn fix_document(&self, doc: &mut Document) -> LinkRewriteReport {
        let mut report = LinkRewriteReport::default();

        for (index, section) in doc.sections.iter_mut().enumerate() {
            if section.translation(&self.language_code).is_none() {
                continue;
            }
            match self.fix_section(section) {
                Some(count) => report.rewritten += count,
                None => report.flagged_sections.push(index),
            }
        }

        report
    }

    /// Rewrite a file's document and flag the file on link mismatches.
    pub fn fix_file(&self, file: &mut DocFile) -> LinkRewriteReport {
        let Some(doc) = file.doc.as_mut() else {
            return LinkRewriteReport::default();
        };

        let report = self.fix_document(doc);
        if report.has_link_errors() {
            file.likely_link_error = true;
            warn!(
                "{}: {} section(s) with a different number of links than the source",
                file.path,
                report.flagged_sections.len()
            );
        }
        debug!("{}: rewrote {} link(s)", file.path, report.rewritten);
        report
    }
}
