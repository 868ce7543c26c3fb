/*!
 * Per-file and per-store translation runs.
 *
 * Within a file, units are translated strictly one after another, each merged
 * before the next is scheduled. Across files, one future per file runs on
 * the current task through a bounded `buffer_unordered` stream; every
 * finished or aborted file is written back to the store and persisted.
 */

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::errors::{StoreError, TranslationError};
use crate::store::{DocFile, DocumentStore};
use super::core::TranslationService;
use super::scheduler::IncrementalScheduler;
use super::state::merge_unit;
use super::validation_loop::ValidationLoop;

/// Default number of files translated at the same time
pub const DEFAULT_MAX_CONCURRENT_FILES: usize = 8;

/// Result of translating one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    /// Units sent to the provider
    pub units: usize,
    /// Units whose reply never passed validation
    pub failed_units: usize,
    /// Failed sections put back into the queue before the run
    pub reset_sections: usize,
    /// The file had no raw text and was skipped
    pub skipped: bool,
}

/// A file run stopped by an unreachable provider.
///
/// `report` counts the units merged before the failure.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct FileAborted {
    pub report: FileReport,
    #[source]
    pub error: TranslationError,
}

/// How one file of a store run ended
#[derive(Debug)]
pub enum FileOutcome {
    /// Every pending unit was processed
    Completed(FileReport),
    /// The provider became unreachable; partial progress was kept
    Aborted(FileAborted),
}

/// Totals of a store run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files processed to the end
    pub completed: usize,
    /// Files skipped for lack of raw text
    pub skipped: usize,
    /// Files with at least one unit that failed validation
    pub with_errors: usize,
    /// Paths of files aborted on an unreachable provider
    pub aborted: Vec<String>,
    /// Units sent to the provider
    pub units: usize,
    /// Units whose reply never passed validation
    pub failed_units: usize,
    /// Paths whose progress could not be written to the store
    pub unsaved: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, path: &str, outcome: &FileOutcome) {
        let report = match outcome {
            FileOutcome::Completed(report) => {
                if report.skipped {
                    self.skipped += 1;
                } else {
                    self.completed += 1;
                }
                report
            }
            FileOutcome::Aborted(aborted) => {
                self.aborted.push(path.to_string());
                &aborted.report
            }
        };
        self.units += report.units;
        self.failed_units += report.failed_units;
        if report.failed_units > 0 {
            self.with_errors += 1;
        }
    }
}

/// Translates files into one language
pub struct FileTranslationOrchestrator<'a> {
    service: &'a TranslationService,
    scheduler: IncrementalScheduler,
    language: String,
    language_code: String,
    retry_failed_sections: bool,
}

impl<'a> FileTranslationOrchestrator<'a> {
    /// Create an orchestrator for a language display name and code
    pub fn new(service: &'a TranslationService, language: &str, language_code: &str) -> Self {
        Self {
            service,
            scheduler: IncrementalScheduler::new(),
            language: language.to_string(),
            language_code: language_code.to_string(),
            retry_failed_sections: false,
        }
    }

    /// Put failed sections back into the queue before translating
    pub fn with_retry_failed_sections(mut self, enabled: bool) -> Self {
        self.retry_failed_sections = enabled;
        self
    }

    /// Translate every pending unit of a file in place.
    ///
    /// On `Err`, the file keeps every unit merged before the failure and is
    /// flagged if one of them failed validation.
    pub async fn translate_file(&self, file: &mut DocFile) -> Result<FileReport, FileAborted> {
        let mut report = FileReport::default();
        let path = file.path.clone();

        let Some(doc) = file.ensure_document() else {
            debug!("Skipping {}: no raw text", path);
            report.skipped = true;
            return Ok(report);
        };

        if self.retry_failed_sections {
            report.reset_sections = doc.reset_failed(&self.language_code);
            if report.reset_sections > 0 {
                info!("{}: retrying {} failed section(s)", path, report.reset_sections);
            }
        }

        let planned = self.scheduler.plan(doc, &self.language_code).len();
        if planned > 0 {
            info!("{}: {} unit(s) to translate", path, planned);
        }

        let validation = ValidationLoop::new(self.service, &self.language);
        let mut file_failed = false;
        let mut unreachable = None;

        while let Some(unit) = self.scheduler.next_unit(doc, &self.language_code) {
            let sections = unit.sections(doc);
            let result = match validation.translate(&sections).await {
                Ok(result) => result,
                Err(error) => {
                    unreachable = Some(error);
                    break;
                }
            };
            report.units += 1;

            let merged = merge_unit(doc, &unit, &result.sections, result.accepted, &self.language_code);
            if merged.failed {
                report.failed_units += 1;
                file_failed = true;
            }
        }

        if file_failed {
            warn!("{}: {} unit(s) failed validation", path, report.failed_units);
            file.mark_error(&self.language_code);
        } else if report.reset_sections > 0 && unreachable.is_none() {
            file.clear_error(&self.language_code);
        }

        match unreachable {
            Some(error) => Err(FileAborted { report, error }),
            None => Ok(report),
        }
    }

    /// Translate every file of a store, persisting after each file.
    ///
    /// Files run concurrently, at most `max_concurrent` at a time.
    pub async fn translate_store(
        &self,
        store: &DocumentStore,
        max_concurrent: usize,
        progress: Option<&ProgressBar>,
    ) -> Result<RunSummary, StoreError> {
        let files = store.snapshot().await;
        info!("Translating {} file(s) into {}", files.len(), self.language);

        let mut outcomes = stream::iter(files)
            .map(|mut file| async move {
                let outcome = match self.translate_file(&mut file).await {
                    Ok(report) => FileOutcome::Completed(report),
                    Err(aborted) => {
                        error!("{}: aborted after {} unit(s), {}", file.path, aborted.report.units, aborted);
                        FileOutcome::Aborted(aborted)
                    }
                };
                let path = file.path.clone();
                let persisted = store.replace_and_persist(file).await;
                (path, outcome, persisted)
            })
            .buffer_unordered(max_concurrent.max(1));

        // A failed write does not stop the other files; the first one is returned at the end
        let mut summary = RunSummary::default();
        let mut write_error = None;
        while let Some((path, outcome, persisted)) = outcomes.next().await {
            if let Err(e) = persisted {
                error!("{}: failed to save progress, {}", path, e);
                summary.unsaved.push(path.clone());
                write_error.get_or_insert(e);
            }
            summary.record(&path, &outcome);
            if let Some(bar) = progress {
                bar.inc(1);
                bar.set_message(path);
            }
        }

        info!(
            "Run finished: {} completed, {} skipped, {} aborted, {} unit(s), {} unsaved",
            summary.completed,
            summary.skipped,
            summary.aborted.len(),
            summary.units,
            summary.unsaved.len()
        );
        match write_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}
