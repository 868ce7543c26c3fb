/*!
 * Tests for unit scheduling and the validated conversation
 */

use yadtwai::providers::mock::MockProvider;
use yadtwai::providers::ChatRole;
use yadtwai::translation::document::{parse, render};
use yadtwai::translation::prompts::corrective_instruction;
use yadtwai::translation::validation_loop::ValidationLoop;
use yadtwai::translation::IncrementalScheduler;
use yadtwai::validation::{ParityFailure, ParityValidator};
use crate::common;

#[test]
fn test_plan_withNestedHeadings_shouldGoBottomUp() {
    let doc = parse("Intro\n# A\nText\n## B\nText\n# C\nText\n");
    let levels: Vec<u8> = doc.sections.iter().map(|s| s.level).collect();
    assert_eq!(levels, vec![0, 1, 2, 1]);

    let plan = IncrementalScheduler::new().plan(&doc, "fr");
    let units: Vec<Vec<usize>> = plan.into_iter().map(|u| u.indices).collect();

    assert_eq!(units, vec![vec![0, 1, 2], vec![0, 3]]);
}

#[test]
fn test_parse_thenRender_shouldReproduceSource() {
    let source = "Preface\n\n# Title\nBody with [link](a.md)\n\n```sh\n# not a heading\n```\n## Sub\nMore\n";
    let doc = parse(source);
    assert_eq!(render(&doc, None), source);
    assert_eq!(parse(&render(&doc, None)), doc);
}

#[test]
fn test_parityCheck_withDroppedLink_shouldAskForMissingLinks() {
    let source = "# Setup\nSee [install](install.md).\n";
    let reply = "# Installation\nVoir l'installation.\n";

    let report = ParityValidator::check(source, 2, reply, parse(reply).len());

    assert!(report.structure_matches());
    assert_eq!(report.failure(), Some(ParityFailure::MissingLinks));
    assert!(corrective_instruction(ParityFailure::MissingLinks).contains("missing some links"));
}

#[tokio::test]
async fn test_translate_withCorrectedReply_shouldAcceptSecondTurn() {
    common::init_logger();
    let provider = MockProvider::scripted([
        "# Installation\nVoir l'installation.\n",
        "# Installation\nVoir [l'installation](install.md).\n",
    ]);
    let service = common::mock_service(&provider);
    let doc = parse("# Setup\nSee [install](install.md).\n");
    let sections: Vec<_> = doc.sections.iter().collect();

    let result = ValidationLoop::new(&service, "French").translate(&sections).await.unwrap();

    assert!(result.accepted);
    assert_eq!(result.turns, 2);
    assert_eq!(result.sections[1].title, "Installation");

    let second = &provider.requests()[1];
    assert_eq!(second.len(), 4);
    assert_eq!(second[2].role, ChatRole::Assistant);
    assert!(second[3].content.contains("missing some links"));
}

#[tokio::test]
async fn test_translate_withTooManySections_shouldAskToShorten() {
    let provider = MockProvider::scripted(["# Un\nA\n# Deux\nB\n", "# Un\nA\n"]);
    let service = common::mock_service(&provider);
    let doc = parse("# One\nA\n");
    let sections: Vec<_> = doc.sections.iter().collect();

    let result = ValidationLoop::new(&service, "French").translate(&sections).await.unwrap();

    assert!(result.accepted);
    assert!(provider.requests()[1][3].content.contains("too long"));
}

#[tokio::test]
async fn test_translate_withFailingProvider_shouldBeUnreachable() {
    let provider = MockProvider::failing();
    let service = common::mock_service(&provider);
    let doc = parse("# One\nA\n");
    let sections: Vec<_> = doc.sections.iter().collect();

    let error = ValidationLoop::new(&service, "French").translate(&sections).await.unwrap_err();

    assert!(matches!(error, yadtwai::TranslationError::Unreachable { attempts: 1, .. }));
    assert_eq!(provider.request_count(), 1);
}
