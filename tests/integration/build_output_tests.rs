/*!
 * Build of translated output from a persisted store
 */

use std::fs;

use yadtwai::app_controller::Controller;
use yadtwai::providers::mock::MockProvider;
use yadtwai::source::LocalSource;
use yadtwai::store::{DocFile, DocumentStore};
use yadtwai::translation::document::{SectionTranslation, TranslatedText, TranslationStatus};
use crate::common;

fn to_french_guide(markdown: &str) -> String {
    markdown.replace("Read", "Lisez").replace("Guide", "Mode d'emploi")
}

#[tokio::test]
async fn test_build_withoutStore_shouldAskToTranslateFirst() {
    let temp_dir = common::create_temp_dir().unwrap();
    let controller = Controller::with_config(common::local_config(temp_dir.path())).unwrap();

    let error = controller.build().await.unwrap_err();

    assert!(error.to_string().contains("please run translate first"));
}

#[tokio::test]
async fn test_build_shouldWriteRewrittenPagesAndSkipUntranslated() {
    common::init_logger();
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(
        temp_dir.path(),
        "docs/guide/index.md",
        "# Guide\nRead [setup](setup.md) or [the site](https://example.com).\n",
    )
    .unwrap();
    let config = common::local_config(temp_dir.path());
    let controller = Controller::with_config(config.clone()).unwrap();

    let provider = MockProvider::translating(to_french_guide);
    let source = LocalSource::new(temp_dir.path().join("docs"));
    controller
        .translate_with(&common::mock_service(&provider), Some(&source))
        .await
        .unwrap();

    // A record that never went through translation
    let store = DocumentStore::open(config.store_path()).await.unwrap();
    store
        .replace_and_persist(DocFile::with_raw("notes.md", "n1", "# Notes\n"))
        .await
        .unwrap();
    let snapshot_before = fs::read_to_string(config.store_path()).unwrap();

    let report = controller.build().await.unwrap();

    assert_eq!(report.written, vec![config.output_path.join("guide/index.md")]);
    assert_eq!(report.skipped, vec!["notes.md".to_string()]);
    assert_eq!(report.link_errors, 0);
    let page = fs::read_to_string(config.output_path.join("guide/index.md")).unwrap();
    assert_eq!(
        page,
        "# Mode d'emploi\nLisez [setup](/docs/fr/setup.md) or [the site](https://example.com).\n"
    );
    assert!(!config.output_path.join("notes.md").exists());
    assert_eq!(fs::read_to_string(config.store_path()).unwrap(), snapshot_before);
}

#[tokio::test]
async fn test_status_afterTranslate_shouldReportProgress() {
    let temp_dir = common::create_temp_dir().unwrap();
    common::create_test_file(temp_dir.path(), "docs/a.md", "# A\nText.\n").unwrap();
    let config = common::local_config(temp_dir.path());
    let controller = Controller::with_config(config.clone()).unwrap();

    let provider = MockProvider::working();
    controller
        .translate_with(
            &common::mock_service(&provider),
            Some(&LocalSource::new(temp_dir.path().join("docs"))),
        )
        .await
        .unwrap();

    let status = controller.status().await.unwrap();

    assert_eq!(status.len(), 1);
    assert_eq!(status[0].path, "a.md");
    assert_eq!(status[0].sections, 2);
    assert_eq!(status[0].translated, 2);
    assert!(!status[0].has_error);
    assert!((status[0].progress - 100.0).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_build_withLinkMismatch_shouldKeepFlagForStatus() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = common::local_config(temp_dir.path());
    let mut file = DocFile::with_raw("a.md", "1", "# A\nNo links here.\n");
    let doc = file.ensure_document().unwrap();
    for (section, (title, content)) in doc.sections.iter_mut().zip([("", ""), ("A", "Pas de [lien](x.md) ici.\n")]) {
        section.translations.insert(
            "fr".to_string(),
            SectionTranslation::new(TranslatedText::new(title, content), TranslationStatus::Translated),
        );
    }
    let store = DocumentStore::open(config.store_path()).await.unwrap();
    store.replace_and_persist(file).await.unwrap();
    let controller = Controller::with_config(config.clone()).unwrap();

    let report = controller.build().await.unwrap();
    let status = controller.status().await.unwrap();

    assert_eq!(report.link_errors, 1);
    assert!(status[0].likely_link_error);
    let stored = DocumentStore::load_existing(config.store_path()).await.unwrap();
    let doc = stored.get("a.md").await.unwrap().doc.unwrap();
    assert_eq!(doc.sections[1].translation("fr").unwrap().content, "Pas de [lien](x.md) ici.\n");
}
