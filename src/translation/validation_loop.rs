/*!
 * Validated translation of one unit.
 *
 * The unit is rendered to markdown and sent in a multi-turn conversation.
 * Each reply is parsed back into sections and checked for section and link
 * parity. A failed check appends the reply and a corrective instruction to
 * the history and asks again, until the history reaches its bound. A
 * provider failure restarts the conversation under the retry policy.
 */

use log::{debug, warn};

use crate::errors::{ProviderError, TranslationError};
use crate::providers::ChatMessage;
use crate::validation::{ParityReport, ParityValidator};
use super::core::TranslationService;
use super::document::{markdown, Section, TranslatedText};
use super::prompts::{corrective_instruction, extract_markdown};
use super::retry::with_retry;

/// Outcome of a unit conversation.
#[derive(Debug, Clone)]
pub struct UnitTranslation {
    /// One candidate per parsed reply section, in order
    pub sections: Vec<TranslatedText>,
    /// Whether the last reply passed every parity check
    pub accepted: bool,
    /// Parity of the last reply
    pub report: ParityReport,
    /// Number of provider calls made in the final conversation
    pub turns: usize,
}

/// Runs the validate-and-correct conversation for units of one language.
pub struct ValidationLoop<'a> {
    service: &'a TranslationService,
    language: String,
}

impl<'a> ValidationLoop<'a> {
    /// Create a loop translating into `language` (display name, e.g. "French")
    pub fn new(service: &'a TranslationService, language: &str) -> Self {
        Self {
            service,
            language: language.to_string(),
        }
    }

    /// Translate the sections of a unit.
    ///
    /// Returns the last candidate with `accepted == false` when the history
    /// bound is reached without a valid reply. Returns
    /// `TranslationError::Unreachable` when the provider keeps failing.
    pub async fn translate(&self, sections: &[&Section]) -> Result<UnitTranslation, TranslationError> {
        let source = markdown::render_sections(sections.iter().copied(), None);
        let policy = self.service.retry_policy();

        with_retry(&policy, "Unit translation", || self.converse(&source, sections.len())).await
    }

    async fn converse(
        &self,
        source: &str,
        source_sections: usize,
    ) -> Result<UnitTranslation, ProviderError> {
        let max_history = self.service.max_history_messages();
        let mut messages = self.service.prompt_builder(&self.language).build_messages(source);
        let mut turns = 0;

        loop {
            let reply = self.service.chat(&messages).await?;
            turns += 1;

            // Some models echo the document tags of the prompt
            let text = extract_markdown(&reply.content).unwrap_or(&reply.content);
            let candidate = markdown::parse(text);
            let report = ParityValidator::check(source, source_sections, text, candidate.len());

            let failure = match report.failure() {
                None => {
                    debug!("Unit accepted after {} turn(s)", turns);
                    return Ok(Self::outcome(&candidate.sections, true, report, turns));
                }
                Some(failure) => failure,
            };

            if messages.len() >= max_history {
                warn!(
                    "Unit still failing parity ({:?}) after {} turn(s), keeping last reply",
                    failure, turns
                );
                return Ok(Self::outcome(&candidate.sections, false, report, turns));
            }

            debug!("Reply rejected ({:?}), asking for a correction", failure);
            messages.push(ChatMessage::assistant(reply.content));
            messages.push(ChatMessage::user(corrective_instruction(failure)));
        }
    }

    fn outcome(sections: &[Section], accepted: bool, report: ParityReport, turns: usize) -> UnitTranslation {
        UnitTranslation {
            sections: sections.iter().map(TranslatedText::from).collect(),
            accepted,
            report,
            turns,
        }
    }
}
