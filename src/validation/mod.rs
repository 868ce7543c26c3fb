/*!
 * Validation module for translation trustworthiness.
 *
 * - `links`: Markdown link detection and local-target classification
 * - `parity`: Section and link parity between a unit and its translation
 */

pub mod links;
pub mod parity;

// Re-export main types
pub use links::{count_links, extract_links, MarkdownLink};
pub use parity::{ParityFailure, ParityReport, ParityValidator};
