/*!
 * End-to-end translate runs through the controller with a local source
 */

use std::sync::Arc;

use yadtwai::app_controller::Controller;
use yadtwai::providers::mock::MockProvider;
use yadtwai::source::LocalSource;
use yadtwai::store::DocumentStore;
use yadtwai::translation::{TranslationService, TranslationStatus};
use crate::common;

const GETTING_STARTED: &str = "# Getting started\nInstall the tool.\n# Usage\nRun it.\n";

fn local_source(root: &std::path::Path) -> LocalSource {
    LocalSource::new(root.join("docs"))
}

#[tokio::test]
async fn test_translate_twoSections_shouldFillFrenchTranslations() {
    common::init_logger();
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "docs/start.md", GETTING_STARTED).unwrap();
    let config = common::local_config(temp_dir.path());
    let provider = MockProvider::translating(common::to_french);
    let service = common::mock_service(&provider);

    let controller = Controller::with_config(config.clone()).unwrap();
    let source = local_source(temp_dir.path());
    let summary = controller.translate_with(&service, Some(&source)).await.unwrap();

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.units, 2);
    assert!(summary.aborted.is_empty());
    assert_eq!(provider.request_count(), 2);

    let store = DocumentStore::load_existing(config.store_path()).await.unwrap();
    let file = store.get("start.md").await.unwrap();
    assert!(!file.has_error("fr"));
    let doc = file.doc.as_ref().unwrap();
    let first = doc.sections[1].translation("fr").unwrap();
    assert_eq!(first.title, "Premiers pas");
    assert_eq!(first.content, "Installez l'outil.\n");
    let second = doc.sections[2].translation("fr").unwrap();
    assert_eq!(second.title, "Utilisation");
    assert_eq!(second.content, "Lancez-le.\n");
    // The preamble is sent with both units; the second value is kept as an alternate
    assert_eq!(doc.sections[0].translation("fr").unwrap().alternates.len(), 1);
    assert_eq!(service.token_usage().requests, 2);
}

#[tokio::test]
async fn test_translate_afterCompletedRun_shouldNotCallProvider() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "docs/start.md", GETTING_STARTED).unwrap();
    let config = common::local_config(temp_dir.path());
    let controller = Controller::with_config(config).unwrap();
    let source = local_source(temp_dir.path());

    let first = MockProvider::translating(common::to_french);
    controller
        .translate_with(&common::mock_service(&first), Some(&source))
        .await
        .unwrap();

    // Same source content, fresh process
    let second = MockProvider::working();
    let summary = controller
        .translate_with(&common::mock_service(&second), Some(&source))
        .await
        .unwrap();

    assert_eq!(summary.units, 0);
    assert_eq!(second.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withProviderDown_shouldKeepPartialProgressAndResume() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "docs/start.md", GETTING_STARTED).unwrap();
    let config = common::local_config(temp_dir.path());
    let controller = Controller::with_config(config.clone()).unwrap();
    let source = local_source(temp_dir.path());

    // Second request fails and no retry is configured
    let flaky = MockProvider::intermittent(2);
    let summary = controller
        .translate_with(&common::mock_service(&flaky), Some(&source))
        .await
        .unwrap();
    assert_eq!(summary.aborted, vec!["start.md".to_string()]);

    let store = DocumentStore::load_existing(config.store_path()).await.unwrap();
    let doc = store.get("start.md").await.unwrap().doc.unwrap();
    assert_eq!(doc.sections[2].status("fr"), TranslationStatus::Translated);
    assert_eq!(doc.sections[1].status("fr"), TranslationStatus::Untranslated);

    let working = MockProvider::working();
    let summary = controller
        .translate_with(&common::mock_service(&working), None)
        .await
        .unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.units, 1);
    assert_eq!(working.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withChangedSource_shouldTranslateFileAgain() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "docs/start.md", GETTING_STARTED).unwrap();
    common::create_test_file(temp_dir.path(), "docs/other.md", "# Other\nText.\n").unwrap();
    let config = common::local_config(temp_dir.path());
    let controller = Controller::with_config(config).unwrap();
    let source = local_source(temp_dir.path());

    let provider = MockProvider::working();
    controller
        .translate_with(&common::mock_service(&provider), Some(&source))
        .await
        .unwrap();
    assert_eq!(provider.request_count(), 3);

    common::create_test_file(temp_dir.path(), "docs/start.md", "# Getting started\nInstall it now.\n").unwrap();
    let provider = MockProvider::working();
    let summary = controller
        .translate_with(&common::mock_service(&provider), Some(&source))
        .await
        .unwrap();

    assert_eq!(summary.units, 1);
    assert_eq!(provider.request_count(), 1);
    assert!(provider.requests()[0][1].content.contains("Install it now."));
}

#[tokio::test]
async fn test_translate_withSlowProvider_shouldRunFilesConcurrently() {
    let temp_dir = common::create_temp_dir().unwrap();
    for name in ["a", "b", "c", "d"] {
        common::create_test_file(temp_dir.path(), &format!("docs/{}.md", name), "# Title\nBody.\n").unwrap();
    }
    let mut config = common::local_config(temp_dir.path());
    config.max_concurrent_files = Some(4);
    let controller = Controller::with_config(config).unwrap();
    let provider = MockProvider::slow(200);
    let service = TranslationService::with_provider(Arc::new(provider.clone()), common::fast_translation_config(0));

    let start = std::time::Instant::now();
    let summary = controller
        .translate_with(&service, Some(&local_source(temp_dir.path())))
        .await
        .unwrap();

    assert_eq!(summary.completed, 4);
    assert_eq!(provider.request_count(), 4);
    assert!(start.elapsed() < std::time::Duration::from_millis(750));
}
