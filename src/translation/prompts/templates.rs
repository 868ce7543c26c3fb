/*!
 * Prompt templates for documentation translation.
 *
 * The system prompt sets the translator role and the structural rules; the
 * user prompt carries the markdown of one unit between `<document>` tags so
 * the reply can be compared section by section.
 */

use crate::providers::ChatMessage;
use crate::validation::ParityFailure;

const DOCUMENT_OPEN: &str = "<document>\n";
const DOCUMENT_CLOSE: &str = "</document>";

/// Prompt template with `{language}` and `{markdown}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Default system prompt for technical documentation.
    pub const DOC_TRANSLATOR: &'static str = r#"You are an expert technical writer. Your goal is to translate a technical documentation into {language}. The user will provide the documentation in markdown format.

## Guidelines
- Only output the translated documentation in Markdown, do not add or remove content.
- Do not translate function names or API endpoint names, only translate the documentation.
- In code blocks only translate comments, never variable names or function names.
- Write {language} that is easy to read and sounds professional rather than translating every expression verbatim.
- If {language} usually uses the English word for a thing, keep it in English.
- Keep module names in English with a best effort translation, and always keep the original name in parenthesis, e.g. "聊天引擎 (ChatEngine)".

## Notes
- This is software documentation: "build" means compile, "watch" means looking at files that change.
- Keep the same heading structure as the original and retain ALL the links and images."#;

    /// Default user prompt wrapping one unit of markdown.
    pub const DOC_REQUEST: &'static str = "The markdown to translate (do not add extra content or remove content, just translate). Do not expand on the content. The text may only contain a title, in this case only translate the title. Original in English:\n\n<document>\n{markdown}</document>\n\nTranslation in {language}:\n\n";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default system template.
    pub fn doc_translator() -> Self {
        Self::new(Self::DOC_TRANSLATOR)
    }

    /// Create the default user template.
    pub fn doc_request() -> Self {
        Self::new(Self::DOC_REQUEST)
    }

    /// Render the template with the given variables.
    ///
    /// The markdown is substituted last so placeholders inside the document
    /// are left untouched.
    pub fn render(&self, language: &str, markdown: &str) -> String {
        self.template
            .replace("{language}", language)
            .replace("{markdown}", markdown)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::doc_translator()
    }
}

/// Builder for the opening turns of a unit conversation.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    language: String,
    system: PromptTemplate,
    user: PromptTemplate,
}

impl TranslationPromptBuilder {
    /// Create a builder with the default templates.
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            system: PromptTemplate::doc_translator(),
            user: PromptTemplate::doc_request(),
        }
    }

    /// Override the templates; empty strings keep the defaults.
    pub fn with_templates(mut self, system: &str, user: &str) -> Self {
        if !system.trim().is_empty() {
            self.system = PromptTemplate::new(system);
        }
        if !user.trim().is_empty() {
            self.user = PromptTemplate::new(user);
        }
        self
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        self.system.render(&self.language, "")
    }

    /// Build the user prompt for a rendered unit.
    pub fn build_user_prompt(&self, markdown: &str) -> String {
        self.user.render(&self.language, markdown)
    }

    /// Build the initial message history for a rendered unit.
    pub fn build_messages(&self, markdown: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.build_system_prompt()),
            ChatMessage::user(self.build_user_prompt(markdown)),
        ]
    }
}

/// Corrective user turn for a failed parity check.
pub fn corrective_instruction(failure: ParityFailure) -> &'static str {
    match failure {
        ParityFailure::TooLong => {
            "The translation seems too long, did you add too much content? Redo it correctly. Only output the translation, no other context."
        }
        ParityFailure::TooShort => {
            "The translation seems too short, did you forget some content? Redo it correctly. Only output the translation, no other context."
        }
        ParityFailure::MissingLinks => {
            "The translation is missing some links! Redo it correctly. Only output the translation, no other context."
        }
        ParityFailure::ExtraLinks => {
            "The translation has EXTRA links! Redo it correctly. Only output the translation, no other context."
        }
    }
}

/// Markdown enclosed in `<document>` tags.
///
/// Applies to the user prompts built here and to replies that echo the tags.
pub fn extract_markdown(text: &str) -> Option<&str> {
    let start = text.find(DOCUMENT_OPEN)? + DOCUMENT_OPEN.len();
    let end = start + text[start..].rfind(DOCUMENT_CLOSE)?;
    Some(&text[start..end])
}
