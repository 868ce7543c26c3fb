/*!
 * Prompt engineering for documentation translation.
 *
 * This module provides:
 * - System and user prompt templates
 * - The opening message history of a unit conversation
 * - Corrective instructions for failed parity checks
 */

pub mod templates;

// Re-export main types
pub use templates::{corrective_instruction, extract_markdown, PromptTemplate, TranslationPromptBuilder};
