/*!
 * Tests for link rewriting of translated documents
 */

use yadtwai::store::DocFile;
use yadtwai::translation::document::{render, SectionTranslation, TranslatedText, TranslationStatus};
use yadtwai::translation::LinkRewriter;

fn translate_all(file: &mut DocFile, translations: &[(&str, &str)]) {
    let doc = file.ensure_document().unwrap();
    for (section, (title, content)) in doc.sections.iter_mut().zip(translations) {
        section.translations.insert(
            "fr".to_string(),
            SectionTranslation::new(TranslatedText::new(*title, *content), TranslationStatus::Translated),
        );
    }
}

#[test]
fn test_fixFile_shouldRewriteLocalLinksAndKeepAnchorText() {
    let mut file = DocFile::with_raw(
        "docs/guide.md",
        "1",
        "# Guide\nStart with [Intro](../intro.md), then [API](#api).\n",
    );
    translate_all(
        &mut file,
        &[("", ""), ("Guide", "Commencez par [Présentation](../intro.md), puis [l'API](#api).\n")],
    );

    let report = LinkRewriter::new("/docs/", "fr").fix_file(&mut file);

    assert_eq!(report.rewritten, 2);
    assert!(!report.has_link_errors());
    assert!(!file.likely_link_error);
    assert_eq!(
        render(file.doc.as_ref().unwrap(), Some("fr")),
        "# Guide\nCommencez par [Présentation](/docs/fr/../intro.md), puis [l'API](#api).\n"
    );
}

#[test]
fn test_fixFile_withTranslatedTarget_shouldRestoreSourceTarget() {
    let mut file = DocFile::with_raw("docs/a.md", "1", "See [the site](https://example.com/en).\n");
    translate_all(&mut file, &[("", "Voir [le site](https://example.com/fr).\n")]);

    LinkRewriter::new("docs", "fr").fix_file(&mut file);

    let section = &file.doc.as_ref().unwrap().sections[0];
    assert_eq!(
        section.translation("fr").unwrap().content,
        "Voir [le site](https://example.com/en).\n"
    );
}

#[test]
fn test_fixFile_withExtraLink_shouldFlagSectionAndFile() {
    let mut file = DocFile::with_raw("docs/a.md", "1", "# A\nNo links here.\n");
    translate_all(&mut file, &[("", ""), ("A", "Pas de [lien](x.md) ici.\n")]);

    let report = LinkRewriter::new("docs", "fr").fix_file(&mut file);

    assert_eq!(report.flagged_sections, vec![1]);
    assert!(file.likely_link_error);
    let translation = file.doc.as_ref().unwrap().sections[1].translation("fr").unwrap();
    assert!(translation.likely_link_error);
    assert_eq!(translation.content, "Pas de [lien](x.md) ici.\n");
}

#[test]
fn test_fixFile_withoutDocument_shouldDoNothing() {
    let mut file = DocFile::new("docs/a.md", "1");
    let report = LinkRewriter::new("docs", "fr").fix_file(&mut file);
    assert_eq!(report.rewritten, 0);
    assert!(!file.likely_link_error);
}
