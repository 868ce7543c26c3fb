/*!
 * Incremental scheduling of translation units.
 *
 * A unit is a pending section together with its chain of ancestor headings,
 * so the provider always sees a section in its heading context. Units are
 * picked bottom-up: the deepest pending section goes first, latest in the
 * document on ties. A parent heading is thus never sent alone before its
 * children, and sections already translated are never sent again for
 * their own sake.
 */

use log::debug;

use super::document::{Document, Section};

/// Contiguous-in-order run of sections submitted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Section indices in ascending document order
    pub indices: Vec<usize>,
}

impl TranslationUnit {
    /// Index of the section the unit was built for.
    pub fn anchor(&self) -> usize {
        self.indices.last().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Borrow the unit's sections from the document.
    pub fn sections<'a>(&self, doc: &'a Document) -> Vec<&'a Section> {
        self.indices
            .iter()
            .filter_map(|&i| doc.section(i))
            .collect()
    }
}

/// Picks the next unit to translate for a language.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalScheduler;

impl IncrementalScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Next unit to translate, or `None` once every section has a record.
    pub fn next_unit(&self, doc: &Document, language_code: &str) -> Option<TranslationUnit> {
        let anchor = Self::select_anchor(doc, |i| doc.sections[i].is_pending(language_code))?;
        let unit = Self::unit_for(doc, anchor);
        debug!(
            "Scheduled unit for section {} (level {}), {} section(s)",
            anchor,
            doc.sections[anchor].level,
            unit.len()
        );
        Some(unit)
    }

    /// Every unit a full run would submit, in order, assuming each succeeds.
    pub fn plan(&self, doc: &Document, language_code: &str) -> Vec<TranslationUnit> {
        let mut pending: Vec<bool> = doc
            .sections
            .iter()
            .map(|s| s.is_pending(language_code))
            .collect();
        let mut units = Vec::new();

        while let Some(anchor) = Self::select_anchor(doc, |i| pending[i]) {
            let unit = Self::unit_for(doc, anchor);
            for &i in &unit.indices {
                pending[i] = false;
            }
            units.push(unit);
        }

        units
    }

    /// Build the unit for a section: itself plus its ancestor headings.
    pub fn unit_for(doc: &Document, index: usize) -> TranslationUnit {
        let mut indices = vec![index];
        let mut level = doc.sections[index].level;

        for j in (0..index).rev() {
            let candidate = doc.sections[j].level;
            if candidate < level {
                level = candidate;
                indices.push(j);
            }
        }

        indices.reverse();
        TranslationUnit { indices }
    }

    /// Deepest pending section, scanning from the end of the document.
    fn select_anchor(doc: &Document, is_pending: impl Fn(usize) -> bool) -> Option<usize> {
        let mut best: Option<usize> = None;
        for i in (0..doc.sections.len()).rev() {
            if !is_pending(i) {
                continue;
            }
            match best {
                Some(b) if doc.sections[b].level >= doc.sections[i].level => {}
                _ => best = Some(i),
            }
        }
        best
    }
}
