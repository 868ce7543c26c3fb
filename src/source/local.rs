/*!
 * Local directory source.
 *
 * Paths are reported relative to the directory, `/`-separated, and hashed
 * with SHA-256 so a changed file is detected like a new GitHub blob.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::{DocumentSource, SourceFile};
use crate::file_utils::FileManager;

/// Documentation stored in a local directory
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    /// Create a source reading the markdown files below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Hex SHA-256 of a text
    pub fn content_hash(text: &str) -> String {
        Sha256::digest(text.as_bytes())
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

#[async_trait]
impl DocumentSource for LocalSource {
    async fn list_files(&self) -> Result<Vec<SourceFile>> {
        if !self.root.is_dir() {
            anyhow::bail!("Documentation directory does not exist: {:?}", self.root);
        }

        let mut files = Vec::new();
        for full in FileManager::find_markdown_files(&self.root)? {
            let Some(path) = self.relative_path(&full) else {
                continue;
            };

            let text = tokio::fs::read_to_string(&full)
                .await
                .with_context(|| format!("Failed to read {:?}", full))?;
            files.push(SourceFile {
                path,
                sha: Self::content_hash(&text),
                download_url: None,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    async fn fetch_raw(&self, file: &SourceFile) -> Result<String> {
        let full = self.root.join(&file.path);
        tokio::fs::read_to_string(&full)
            .await
            .with_context(|| format!("Failed to read {:?}", full))
    }
}
