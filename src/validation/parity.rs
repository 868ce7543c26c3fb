/*!
 * Structural and link parity between a unit and its translation.
 *
 * Both checks are best-effort heuristics: equal section counts and equal
 * link counts do not prove the translation is faithful, they only catch the
 * common ways a model drops or invents content.
 */

use log::debug;

use super::links::count_links;

/// Which parity check failed, in the order corrections are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityFailure {
    /// More sections than the source
    TooLong,
    /// Fewer sections than the source
    TooShort,
    /// Fewer links than the source
    MissingLinks,
    /// More links than the source
    ExtraLinks,
}

/// Section and link counts of a source unit and a candidate translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParityReport {
    pub expected_sections: usize,
    pub actual_sections: usize,
    pub expected_links: usize,
    pub actual_links: usize,
}

impl ParityReport {
    pub fn too_long(&self) -> bool {
        self.actual_sections > self.expected_sections
    }

    pub fn too_short(&self) -> bool {
        self.actual_sections < self.expected_sections
    }

    pub fn missing_links(&self) -> bool {
        self.actual_links < self.expected_links
    }

    pub fn extra_links(&self) -> bool {
        self.actual_links > self.expected_links
    }

    /// Section counts match.
    pub fn structure_matches(&self) -> bool {
        self.actual_sections == self.expected_sections
    }

    /// Both section and link counts match.
    pub fn passed(&self) -> bool {
        self.structure_matches() && self.actual_links == self.expected_links
    }

    /// First failing check, structure before links.
    pub fn failure(&self) -> Option<ParityFailure> {
        if self.too_long() {
            Some(ParityFailure::TooLong)
        } else if self.too_short() {
            Some(ParityFailure::TooShort)
        } else if self.missing_links() {
            Some(ParityFailure::MissingLinks)
        } else if self.extra_links() {
            Some(ParityFailure::ExtraLinks)
        } else {
            None
        }
    }
}

/// Parity validator for unit translations
pub struct ParityValidator;

impl ParityValidator {
    /// Compare a candidate reply against the rendered source unit.
    ///
    /// # Arguments
    /// * `source_text` - The rendered unit sent to the provider
    /// * `source_sections` - Number of sections in the unit
    /// * `candidate_text` - The raw reply
    /// * `candidate_sections` - Number of sections parsed from the reply
    pub fn check(
        source_text: &str,
        source_sections: usize,
        candidate_text: &str,
        candidate_sections: usize,
    ) -> ParityReport {
        let report = ParityReport {
            expected_sections: source_sections,
            actual_sections: candidate_sections,
            expected_links: count_links(source_text),
            actual_links: count_links(candidate_text),
        };

        debug!(
            "Parity check: sections {}/{}, links {}/{}",
            report.actual_sections, report.expected_sections, report.actual_links, report.expected_links
        );

        report
    }
}
