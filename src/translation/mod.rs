/*!
 * Hierarchical translation of markdown documents.
 *
 * This module contains everything between a parsed document and a provider:
 *
 * - `document`: section model, markdown parsing and rendering
 * - `scheduler`: picks the next unit of sections to translate
 * - `prompts`: prompt templates and corrective instructions
 * - `core`: translation service wrapping a provider
 * - `retry`: retry policy for provider calls
 * - `validation_loop`: conversation with the provider until a reply passes
 * - `state`: merging a validated reply back into the document
 * - `orchestrator`: per-file and per-store runs
 * - `links`: link rewriting for the published output
 */

pub use self::core::{TokenUsageStats, TranslationService};
pub use self::document::{Document, Section, TranslationStatus};
pub use self::links::{LinkRewriteReport, LinkRewriter};
pub use self::orchestrator::{FileAborted, FileReport, FileTranslationOrchestrator, RunSummary};
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};
pub use self::scheduler::{IncrementalScheduler, TranslationUnit};

pub mod core;
pub mod document;
pub mod links;
pub mod orchestrator;
pub mod prompts;
pub mod retry;
pub mod scheduler;
pub mod state;
pub mod validation_loop;
