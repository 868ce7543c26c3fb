use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::app_config::{Config, SourceKind};
use crate::errors::StoreError;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::source::{DocumentSource, GitHubSource, LocalSource};
use crate::store::DocumentStore;
use crate::translation::document;
use crate::translation::{FileTranslationOrchestrator, LinkRewriter, RunSummary, TranslationService, TranslationStatus};

// @module: Application controller for documentation translation

/// Counts of a source synchronization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files listed by the source
    pub listed: usize,
    /// New files added to the store
    pub added: usize,
    /// Files whose content changed upstream
    pub updated: usize,
    /// Raw texts downloaded
    pub fetched: usize,
    /// Paths whose download failed
    pub failed: Vec<String>,
}

/// Result of rendering the translated documents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Files written
    pub written: Vec<PathBuf>,
    /// Paths without any translation for the language
    pub skipped: Vec<String>,
    /// Files with a link count mismatch in some section
    pub link_errors: usize,
}

/// Translation progress of one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileStatus {
    pub path: String,
    pub sections: usize,
    pub translated: usize,
    pub failed: usize,
    /// Percentage of sections with a translation, failed ones included
    pub progress: f32,
    pub has_error: bool,
    pub likely_link_error: bool,
}

/// Main application controller for documentation translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalized target language code, the key of translations in the store
    pub fn language_code(&self) -> Result<String> {
        language_utils::normalize_language_code(&self.config.language_code)
    }

    /// Create the configured documentation source
    pub fn create_source(&self) -> Result<Box<dyn DocumentSource>> {
        let source = &self.config.source;
        match source.kind {
            SourceKind::GitHub => Ok(Box::new(GitHubSource::new(
                &source.owner,
                &source.repo,
                &source.path,
                source.token.as_deref(),
                source.api_base_url.as_deref(),
            )?)),
            SourceKind::Local => {
                let root = source
                    .local_root
                    .clone()
                    .ok_or_else(|| anyhow!("source.local_root is required for a local source"))?;
                Ok(Box::new(LocalSource::new(root)))
            }
        }
    }

    /// Open the store of the configured repository, creating its directory
    pub async fn open_store(&self) -> Result<DocumentStore> {
        DocumentStore::open(self.config.store_path())
            .await
            .context("Failed to open the document store")
    }

    /// Merge the source listing into the store and download missing raw texts
    pub async fn sync_sources(&self, store: &DocumentStore, source: &dyn DocumentSource) -> Result<SyncReport> {
        let listing = source.list_files().await.context("Failed to list documentation files")?;
        let merged = store.merge_listing(&listing).await;
        info!(
            "Listed {} file(s): {} new, {} changed, {} unchanged",
            listing.len(),
            merged.added,
            merged.updated,
            merged.unchanged
        );

        let mut report = SyncReport {
            listed: listing.len(),
            added: merged.added,
            updated: merged.updated,
            ..SyncReport::default()
        };

        let missing = store.missing_raw().await;
        let mut downloads = stream::iter(missing)
            .map(|file| async move {
                let raw = source.fetch_raw(&file).await;
                (file.path, raw)
            })
            .buffer_unordered(self.config.concurrency());

        while let Some((path, raw)) = downloads.next().await {
            match raw {
                Ok(raw) => {
                    debug!("Fetched {} ({} bytes)", path, raw.len());
                    store.set_raw(&path, raw).await;
                    report.fetched += 1;
                }
                Err(e) => {
                    warn!("Failed to fetch {}: {:#}", path, e);
                    report.failed.push(path);
                }
            }
        }

        store.persist().await?;
        Ok(report)
    }

    /// Translate every file of the store, syncing the source first when `fetch` is set
    pub async fn translate(&self, fetch: bool) -> Result<RunSummary> {
        let service = TranslationService::new(self.config.translation.clone())?;
        if let Err(e) = service.test_connection().await {
            warn!("Connection test to {} failed: {}", service.provider_name(), e);
        }

        let source = if fetch { Some(self.create_source()?) } else { None };
        self.translate_with(&service, source.as_deref()).await
    }

    /// Translate with an existing service and optional source
    pub async fn translate_with(
        &self,
        service: &TranslationService,
        source: Option<&dyn DocumentSource>,
    ) -> Result<RunSummary> {
        let start_time = Instant::now();
        let language = self.config.language_name()?;
        let language_code = self.language_code()?;

        let store = self.open_store().await?;
        if let Some(source) = source {
            let sync = self.sync_sources(&store, source).await?;
            if !sync.failed.is_empty() {
                warn!("{} file(s) could not be fetched and will be skipped", sync.failed.len());
            }
        }

        let total = store.len().await;
        let progress_bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let orchestrator = FileTranslationOrchestrator::new(service, &language, &language_code)
            .with_retry_failed_sections(self.config.retry_failed_sections);
        let summary = orchestrator
            .translate_store(&store, self.config.concurrency(), Some(&progress_bar))
            .await?;
        progress_bar.finish_and_clear();

        for path in &summary.aborted {
            error!("Translation aborted for {}: provider unreachable, progress kept", path);
        }
        info!(
            "Translated into {} in {}: {} file(s), {} unit(s), {} failed",
            language,
            Self::format_duration(start_time.elapsed()),
            summary.completed,
            summary.units,
            summary.failed_units
        );
        info!("{}", service.token_usage().summary());

        Ok(summary)
    }

    /// Render the translated documents into the output directory.
    ///
    /// Links are rewritten on a copy of each document. Only the per-file link
    /// error flags are written back to the store.
    pub async fn build(&self) -> Result<BuildReport> {
        let language_code = self.language_code()?;
        let store = match DocumentStore::load_existing(self.config.store_path()).await {
            Ok(store) => store,
            Err(StoreError::NotFound(path)) => {
                return Err(anyhow!("No save file found at {:?}, please run translate first", path));
            }
            Err(e) => return Err(e.into()),
        };

        FileManager::ensure_dir(&self.config.output_path)?;
        let rewriter = LinkRewriter::new(&self.config.doc_dir, &language_code);
        let mut report = BuildReport::default();
        let mut flags_changed = false;

        for mut file in store.snapshot().await {
            if !file.has_translation(&language_code) {
                warn!("failed to find translation for {}", file.path);
                report.skipped.push(file.path);
                continue;
            }

            let flagged = rewriter.fix_file(&mut file).has_link_errors();
            if flagged {
                report.link_errors += 1;
            }
            flags_changed |= store.set_link_error(&file.path, flagged).await;
            let Some(doc) = file.doc.as_ref() else {
                continue;
            };
            if !doc.is_fully_translated(&language_code) {
                warn!("{} is partially translated, untranslated sections are left out", file.path);
            }

            let rendered = document::render(doc, Some(&language_code));
            let output = FileManager::output_path_for(&self.config.output_path, &file.path, &self.config.prefix_to_remove)?;
            FileManager::write_to_file(&output, &rendered)?;
            debug!("Wrote {:?}", output);
            report.written.push(output);
        }

        info!(
            "Built {} file(s) into {:?}, {} without translation",
            report.written.len(),
            self.config.output_path,
            report.skipped.len()
        );
        if flags_changed {
            store.persist().await?;
        }
        Ok(report)
    }

    /// Per-file translation progress for the configured language
    pub async fn status(&self) -> Result<Vec<FileStatus>> {
        let language_code = self.language_code()?;
        let store = DocumentStore::load_existing(self.config.store_path())
            .await
            .context("No save file found, please run translate first")?;

        Ok(store
            .snapshot()
            .await
            .iter()
            .map(|file| {
                let (sections, translated, failed, progress) = match file.doc.as_ref() {
                    Some(doc) => (
                        doc.len(),
                        doc.count_status(&language_code, TranslationStatus::Translated),
                        doc.count_status(&language_code, TranslationStatus::Failed),
                        doc.translation_progress(&language_code),
                    ),
                    None => (0, 0, 0, 0.0),
                };
                FileStatus {
                    path: file.path.clone(),
                    sections,
                    translated,
                    failed,
                    progress,
                    has_error: file.has_error(&language_code),
                    likely_link_error: file.likely_link_error,
                }
            })
            .collect())
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
