/*!
 * Common test utilities for the yadtwai test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use yadtwai::app_config::{Config, SourceKind, TranslationConfig};
use yadtwai::providers::mock::MockProvider;
use yadtwai::translation::TranslationService;

/// Install env_logger once so `RUST_LOG=debug` shows library logs
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, parents included
pub fn create_test_file(dir: &Path, relative: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Translation settings without delays or retries
pub fn fast_translation_config(retry_count: u32) -> TranslationConfig {
    let mut config = TranslationConfig::default();
    config.common.rate_limit_delay_ms = 0;
    config.common.retry_backoff_ms = 0;
    config.common.retry_count = retry_count;
    for provider in &mut config.available_providers {
        provider.rate_limit = None;
    }
    config
}

/// Service around a mock provider
pub fn mock_service(provider: &MockProvider) -> TranslationService {
    TranslationService::with_provider(Arc::new(provider.clone()), fast_translation_config(0))
}

/// French config reading `<root>/docs` and saving under `<root>`
pub fn local_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.language_code = "fr".to_string();
    config.doc_dir = "docs".to_string();
    config.source.kind = SourceKind::Local;
    config.source.owner = "acme".to_string();
    config.source.repo = "handbook".to_string();
    config.source.local_root = Some(root.join("docs"));
    config.save_path = root.join("saved");
    config.output_path = root.join("output");
    config.prefix_to_remove = String::new();
    config.max_concurrent_files = Some(2);
    config.translation = fast_translation_config(0);
    config
}

/// Word-for-word English to French used by the translating mock
pub fn to_french(markdown: &str) -> String {
    markdown
        .replace("Getting started", "Premiers pas")
        .replace("Install the tool.", "Installez l'outil.")
        .replace("Usage", "Utilisation")
        .replace("Run it.", "Lancez-le.")
        .replace("See the", "Voir le")
}
