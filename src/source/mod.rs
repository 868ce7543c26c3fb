/*!
 * Documentation sources.
 *
 * A source lists the markdown files of a documentation tree with a content
 * hash, and fetches their raw text on demand:
 * - `github`: GitHub contents API
 * - `local`: a directory on disk
 */

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod github;
pub mod local;

pub use github::GitHubSource;
pub use local::LocalSource;

/// Extensions treated as documentation pages
const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// One file of a documentation listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the source root, `/`-separated
    pub path: String,
    /// Content hash
    pub sha: String,
    /// Where the raw text can be fetched, if the source needs it
    pub download_url: Option<String>,
}

/// Lists and fetches documentation files
#[async_trait]
pub trait DocumentSource: Send + Sync + Debug {
    /// Every markdown file below the documentation root, recursively
    async fn list_files(&self) -> Result<Vec<SourceFile>>;

    /// Raw text of a listed file
    async fn fetch_raw(&self, file: &SourceFile) -> Result<String>;
}

/// Whether a path names a markdown page.
pub fn is_markdown_path(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| MARKDOWN_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

/// Rough token count used for progress reporting.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
