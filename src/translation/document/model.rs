/*!
 * Core document model types for markdown translation.
 *
 * A markdown file is held as an ordered sequence of heading-scoped sections.
 * Each section carries its per-language translation records, so the whole
 * model can be serialized into the durable store and resumed later.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder stored when the provider returned fewer sections than asked for.
pub const EMPTY_LINE_SENTINEL: &str = "\n";

/// Markdown document as an ordered list of sections.
///
/// The first section is always the untitled level-0 preamble. Sections are
/// never removed once created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Sections in source order
    pub sections: Vec<Section>,
}

impl Document {
    /// Create a document from already split sections.
    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Number of sections, preamble included.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the document has no section at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Get a section by index.
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Whether any translation was produced for the language.
    ///
    /// Every unit carries the preamble, so the preamble is translated as soon
    /// as the first unit of the file was merged.
    pub fn has_translation(&self, language_code: &str) -> bool {
        self.sections
            .first()
            .is_some_and(|s| s.translation(language_code).is_some())
    }

    /// Check if all sections have a translation (successful or not).
    pub fn is_fully_translated(&self, language_code: &str) -> bool {
        self.sections
            .iter()
            .all(|s| s.status(language_code) != TranslationStatus::Untranslated)
    }

    /// Count sections with the given status for a language.
    pub fn count_status(&self, language_code: &str, status: TranslationStatus) -> usize {
        self.sections
            .iter()
            .filter(|s| s.status(language_code) == status)
            .count()
    }

    /// Get translation progress as a percentage.
    pub fn translation_progress(&self, language_code: &str) -> f32 {
        if self.sections.is_empty() {
            return 100.0;
        }
        let pending = self.count_status(language_code, TranslationStatus::Untranslated);
        let done = self.sections.len() - pending;
        (done as f32 / self.sections.len() as f32) * 100.0
    }

    /// Drop failed translations for a language so they are scheduled again.
    ///
    /// Returns the number of sections reset.
    pub fn reset_failed(&mut self, language_code: &str) -> usize {
        let mut reset = 0;
        for section in &mut self.sections {
            if section.status(language_code) == TranslationStatus::Failed {
                section.translations.remove(language_code);
                reset += 1;
            }
        }
        reset
    }
}

/// A heading-scoped span of a markdown document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text, empty for the preamble
    pub title: String,

    /// Heading depth, 0 for the preamble
    pub level: u8,

    /// Body text up to the next heading, line terminators included
    pub content: String,

    /// Translation records keyed by language code
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, SectionTranslation>,
}

impl Section {
    /// Create an untranslated section.
    pub fn new(title: impl Into<String>, level: u8, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level,
            content: content.into(),
            translations: BTreeMap::new(),
        }
    }

    /// Create the untitled level-0 section.
    pub fn preamble(content: impl Into<String>) -> Self {
        Self::new(String::new(), 0, content)
    }

    /// Whether this is the untitled section before the first heading.
    pub fn is_preamble(&self) -> bool {
        self.level == 0
    }

    /// Translation record for a language, if any.
    pub fn translation(&self, language_code: &str) -> Option<&SectionTranslation> {
        self.translations.get(language_code)
    }

    /// Mutable translation record for a language, if any.
    pub fn translation_mut(&mut self, language_code: &str) -> Option<&mut SectionTranslation> {
        self.translations.get_mut(language_code)
    }

    /// Translation status for a language.
    pub fn status(&self, language_code: &str) -> TranslationStatus {
        self.translation(language_code)
            .map(|t| t.status)
            .unwrap_or(TranslationStatus::Untranslated)
    }

    /// Whether the section still has to be sent for translation.
    pub fn is_pending(&self, language_code: &str) -> bool {
        self.status(language_code) == TranslationStatus::Untranslated
    }
}

/// Translation state of a section for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    #[default]
    Untranslated,
    Translated,
    Failed,
}

/// Title and body of a translated section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedText {
    pub title: String,
    pub content: String,
}

impl TranslatedText {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Entry used when the provider dropped a section.
    pub fn sentinel() -> Self {
        Self::new(EMPTY_LINE_SENTINEL, EMPTY_LINE_SENTINEL)
    }
}

impl From<&Section> for TranslatedText {
    fn from(section: &Section) -> Self {
        Self::new(section.title.clone(), section.content.clone())
    }
}

/// Per-language translation record of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTranslation {
    /// Whether the value came from an accepted unit
    pub status: TranslationStatus,

    /// Current translated heading text
    pub title: String,

    /// Current translated body
    pub content: String,

    /// Later candidates received while the section was sent as context
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<TranslatedText>,

    /// Link counts of the original and translated body differ
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub likely_link_error: bool,
}

impl SectionTranslation {
    pub fn new(text: TranslatedText, status: TranslationStatus) -> Self {
        Self {
            status,
            title: text.title,
            content: text.content,
            alternates: Vec::new(),
            likely_link_error: false,
        }
    }
}
