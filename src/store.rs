/*!
 * Durable JSON store of documentation files.
 *
 * The whole file list lives in a single JSON array at
 * `<save_path>/<owner>/<repo>.json`. It is rewritten after every file of a
 * run completes, so an interrupted run resumes from the last written state.
 * Writes go through a temporary file and a rename, under the store lock.
 */

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::errors::StoreError;
use crate::source::{estimate_tokens, SourceFile};
use crate::translation::document::{self, Document};

/// One documentation file with its parsed document and translation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocFile {
    /// Path relative to the source root
    pub path: String,

    /// Content hash reported by the source
    pub sha: String,

    /// Where the raw text is fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    /// Raw markdown, once fetched
    #[serde(default, rename = "raw", skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,

    /// Estimated token count of the raw text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,

    /// Parsed document, created on the first translation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Document>,

    /// Languages for which a unit could not be validated
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translation_errors: BTreeMap<String, bool>,

    /// Some translated block has a different number of links than its source
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub likely_link_error: bool,
}

impl DocFile {
    /// Create a file record without content
    pub fn new(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sha: sha.into(),
            download_url: None,
            raw_text: None,
            token_count: None,
            doc: None,
            translation_errors: BTreeMap::new(),
            likely_link_error: false,
        }
    }

    /// Create a file record from a source listing entry
    pub fn from_source(source: &SourceFile) -> Self {
        let mut file = Self::new(source.path.clone(), source.sha.clone());
        file.download_url = source.download_url.clone();
        file
    }

    /// Create a file record with its raw text
    pub fn with_raw(path: impl Into<String>, sha: impl Into<String>, raw: impl Into<String>) -> Self {
        let mut file = Self::new(path, sha);
        file.set_raw(raw.into());
        file
    }

    /// Last component of the path
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Store the raw text and its token estimate
    pub fn set_raw(&mut self, raw: String) {
        self.token_count = Some(estimate_tokens(&raw));
        self.raw_text = Some(raw);
    }

    /// Parse the document on first use.
    ///
    /// Returns `None` while the raw text has not been fetched. An existing
    /// document is never rebuilt.
    pub fn ensure_document(&mut self) -> Option<&mut Document> {
        if self.doc.is_none() {
            let raw = self.raw_text.as_deref()?;
            self.doc = Some(document::parse(raw));
        }
        self.doc.as_mut()
    }

    /// Whether any translation exists for the language
    pub fn has_translation(&self, language_code: &str) -> bool {
        self.doc
            .as_ref()
            .is_some_and(|doc| doc.has_translation(language_code))
    }

    /// Flag a translation error for the language
    pub fn mark_error(&mut self, language_code: &str) {
        self.translation_errors.insert(language_code.to_string(), true);
    }

    /// Drop the translation error flag of the language
    pub fn clear_error(&mut self, language_code: &str) {
        self.translation_errors.remove(language_code);
    }

    /// Whether a translation error was flagged for the language
    pub fn has_error(&self, language_code: &str) -> bool {
        self.translation_errors
            .get(language_code)
            .copied()
            .unwrap_or(false)
    }
}

/// Counts of a listing merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// New paths appended
    pub added: usize,
    /// Known paths whose hash changed
    pub updated: usize,
    /// Known paths with the same hash
    pub unchanged: usize,
}

/// File list shared by the concurrent translations of a run
#[derive(Debug)]
pub struct DocumentStore {
    /// Snapshot location
    path: PathBuf,
    /// Files in listing order
    files: Mutex<Vec<DocFile>>,
}

impl DocumentStore {
    /// Snapshot path for a repository
    pub fn store_path(save_path: &Path, owner: &str, repo: &str) -> PathBuf {
        save_path.join(owner).join(format!("{}.json", repo))
    }

    /// Create an in-memory store that persists to `path`
    pub fn new(path: impl Into<PathBuf>, files: Vec<DocFile>) -> Self {
        Self {
            path: path.into(),
            files: Mutex::new(files),
        }
    }

    /// Load the snapshot if present, or start empty and create its directory
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Self::load_existing(path).await;
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        debug!("No snapshot at {:?}, starting empty", path);
        Ok(Self::new(path, Vec::new()))
    }

    /// Load the snapshot, failing when it does not exist
    pub async fn load_existing(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(StoreError::NotFound(path)),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let files: Vec<DocFile> = serde_json::from_str(&json)?;
        info!("Loaded {} file(s) from {:?}", files.len(), path);
        Ok(Self::new(path, files))
    }

    /// Snapshot location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of every file record
    pub async fn snapshot(&self) -> Vec<DocFile> {
        self.files.lock().await.clone()
    }

    /// Number of file records
    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    /// Whether the store holds no file
    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }

    /// Copy of one file record
    pub async fn get(&self, path: &str) -> Option<DocFile> {
        self.files.lock().await.iter().find(|f| f.path == path).cloned()
    }

    /// Write a file record back and persist the whole array
    pub async fn replace_and_persist(&self, file: DocFile) -> Result<(), StoreError> {
        let mut files = self.files.lock().await;
        match files.iter_mut().find(|f| f.path == file.path) {
            Some(slot) => *slot = file,
            None => files.push(file),
        }
        Self::write_snapshot(&self.path, &files).await
    }

    /// Persist the whole array
    pub async fn persist(&self) -> Result<(), StoreError> {
        let files = self.files.lock().await;
        Self::write_snapshot(&self.path, &files).await
    }

    async fn write_snapshot(path: &Path, files: &[DocFile]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(files)?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        debug!("Persisted {} file(s) to {:?}", files.len(), path);
        Ok(())
    }

    /// Merge a fresh listing into the store.
    ///
    /// New paths are appended. A changed hash replaces the record, dropping
    /// its raw text and document so the file is fetched and translated again.
    pub async fn merge_listing(&self, listing: &[SourceFile]) -> MergeStats {
        let mut files = self.files.lock().await;
        let mut stats = MergeStats::default();

        for source in listing {
            match files.iter_mut().find(|f| f.path == source.path) {
                Some(existing) if existing.sha != source.sha => {
                    info!("Source changed, resetting {}", source.path);
                    *existing = DocFile::from_source(source);
                    stats.updated += 1;
                }
                Some(existing) => {
                    if existing.download_url.is_none() {
                        existing.download_url = source.download_url.clone();
                    }
                    stats.unchanged += 1;
                }
                None => {
                    files.push(DocFile::from_source(source));
                    stats.added += 1;
                }
            }
        }

        stats
    }

    /// Set the link error flag of a file; returns whether it changed
    pub async fn set_link_error(&self, path: &str, flagged: bool) -> bool {
        let mut files = self.files.lock().await;
        match files.iter_mut().find(|f| f.path == path) {
            Some(file) if file.likely_link_error != flagged => {
                file.likely_link_error = flagged;
                true
            }
            _ => false,
        }
    }

    /// Listing entries of the files whose raw text is missing
    pub async fn missing_raw(&self) -> Vec<SourceFile> {
        self.files
            .lock()
            .await
            .iter()
            .filter(|f| f.raw_text.is_none())
            .map(|f| SourceFile {
                path: f.path.clone(),
                sha: f.sha.clone(),
                download_url: f.download_url.clone(),
            })
            .collect()
    }

    /// Store the raw text of a file; returns false for an unknown path
    pub async fn set_raw(&self, path: &str, raw: String) -> bool {
        let mut files = self.files.lock().await;
        match files.iter_mut().find(|f| f.path == path) {
            Some(file) => {
                file.set_raw(raw);
                true
            }
            None => false,
        }
    }
}
