/*!
 * Merge of unit translations into the document.
 *
 * The first value a section receives for a language is authoritative. Later
 * candidates for the same section, received while it travels as ancestor
 * context of another unit, are kept in `alternates` and never rendered.
 */

use log::debug;

use super::document::{Document, SectionTranslation, TranslatedText, TranslationStatus};
use super::scheduler::TranslationUnit;

/// Result of merging one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Sections that received their first value
    pub assigned: usize,
    /// Sections that already had a value and got an alternate
    pub alternates: usize,
    /// Candidates missing from the reply, replaced by the sentinel
    pub missing: usize,
    /// The file should be flagged with a translation error
    pub failed: bool,
}

/// Merge the candidates of a unit into the document.
///
/// Candidates pair with the unit sections by position. Missing candidates
/// become the empty-line sentinel and extra ones are ignored.
pub fn merge_unit(
    doc: &mut Document,
    unit: &TranslationUnit,
    candidates: &[TranslatedText],
    accepted: bool,
    language_code: &str,
) -> MergeOutcome {
    let mut outcome = MergeOutcome {
        failed: !accepted || candidates.len() != unit.len(),
        ..Default::default()
    };
    let status = if accepted {
        TranslationStatus::Translated
    } else {
        TranslationStatus::Failed
    };

    for (position, &index) in unit.indices.iter().enumerate() {
        let Some(section) = doc.sections.get_mut(index) else {
            continue;
        };
        let candidate = match candidates.get(position) {
            Some(candidate) => candidate.clone(),
            None => {
                outcome.missing += 1;
                TranslatedText::sentinel()
            }
        };

        match section.translation_mut(language_code) {
            Some(existing) => {
                existing.alternates.push(candidate);
                outcome.alternates += 1;
            }
            None => {
                section
                    .translations
                    .insert(language_code.to_string(), SectionTranslation::new(candidate, status));
                outcome.assigned += 1;
            }
        }
    }

    debug!(
        "Merged unit at section {}: {} assigned, {} alternates, {} missing",
        unit.anchor(),
        outcome.assigned,
        outcome.alternates,
        outcome.missing
    );

    outcome
}
