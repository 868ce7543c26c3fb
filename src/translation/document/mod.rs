/*!
 * Document modeling for markdown translation.
 *
 * This module provides the section tree used by the translation engine:
 * - Heading-scoped sections with per-language translation records
 * - Lossless parsing and rendering of the source markdown
 * - Rendering of a translated document for one language
 */

pub mod markdown;
pub mod model;

// Re-export types used by other modules
pub use markdown::{parse, render, render_sections};
pub use model::{
    Document, Section, SectionTranslation, TranslatedText, TranslationStatus, EMPTY_LINE_SENTINEL,
};
