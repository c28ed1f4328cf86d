use std::collections::BTreeSet;
use std::path::Path;

use citescan_core::{CitationMetrics, Classifier, ExtractionResult, TextBackend};

use crate::citation::CitationCandidate;
use crate::config::ParsingConfig;
use crate::section::ReferenceSection;
use crate::{ParsingError, assembler, citation, gaps, section, text_processing};

/// A configurable citation extraction pipeline.
///
/// Holds a [`ParsingConfig`] and the [`Classifier`] frozen from it, and
/// exposes each pipeline step as a method. Immutable once built, so one
/// extractor can serve any number of documents, including concurrently.
pub struct CitationExtractor {
    config: ParsingConfig,
    classifier: Classifier,
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CitationExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParsingConfig::default())
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        let classifier = config.classifier();
        Self { config, classifier }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Get the classifier frozen from the config's allow-list.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Repair extraction artifacts (step 1).
    pub fn normalize(&self, text: &str) -> String {
        text_processing::normalize(text)
    }

    /// Locate the references section in normalized text (step 2).
    pub fn find_references_section<'a>(&self, text: &'a str) -> ReferenceSection<'a> {
        section::find_references_section_with_config(text, &self.config)
    }

    /// Parse well-formed entries from the section (step 3).
    pub fn parse_primary(&self, ref_text: &str) -> Vec<CitationCandidate> {
        citation::parse_primary(ref_text)
    }

    /// Synthesize candidates for numbers the primary parser missed (step 4).
    pub fn fill_gaps(&self, ref_text: &str, parsed: &BTreeSet<u32>) -> Vec<CitationCandidate> {
        gaps::fill_gaps_with_config(ref_text, parsed, &self.config)
    }

    /// Run the full pipeline on a document file.
    pub fn extract_from_path(
        &self,
        path: &Path,
        backend: &dyn TextBackend,
    ) -> Result<ExtractionResult, ParsingError> {
        let text = backend.extract_text(path)?;
        self.extract_from_text(&text)
    }

    /// Run the pipeline on already-extracted text.
    ///
    /// Fails only when there is no usable text; every other irregularity
    /// degrades to best-effort records or validation warnings.
    pub fn extract_from_text(&self, raw: &str) -> Result<ExtractionResult, ParsingError> {
        if raw.trim().is_empty() {
            return Err(ParsingError::NoUsableText);
        }

        let text = self.normalize(raw);
        let section = self.find_references_section(&text);
        tracing::debug!(
            strategy = section.strategy.as_str(),
            len = section.text.len(),
            "located references section"
        );

        let parsed = assembler::dedupe(self.parse_primary(section.text));
        let parsed_numbers: BTreeSet<u32> = parsed.keys().copied().collect();
        let gap_filled = self.fill_gaps(section.text, &parsed_numbers);

        let records = assembler::assemble(parsed, gap_filled, &text, &self.classifier);
        let metrics = CitationMetrics::from_records(&records);
        let warnings = metrics.validation_warnings();
        for warning in &warnings {
            tracing::warn!(%warning, "citation metrics are inconsistent");
        }

        tracing::info!(
            citations = metrics.total_citations,
            occurrences = metrics.total_occurrences,
            parsed = parsed_numbers.len(),
            "extracted citations"
        );

        Ok(ExtractionResult {
            records,
            metrics,
            section_strategy: section.strategy,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParsingConfigBuilder;
    use citescan_core::{Category, Origin, RecordSource, SectionStrategy};

    #[test]
    fn test_empty_input_is_rejected() {
        let ext = CitationExtractor::new();
        assert!(matches!(
            ext.extract_from_text("   \n\t"),
            Err(ParsingError::NoUsableText)
        ));
    }

    #[test]
    fn test_scenario_web_citation_counted_everywhere() {
        let ext = CitationExtractor::new();
        let text = "Exports grew [1]. Imports also grew [1].\n\nReferences\n[1] [Web] Example Title: https://example.com\n";
        let result = ext.extract_from_text(text).unwrap();
        assert_eq!(result.section_strategy, SectionStrategy::Heading);
        assert_eq!(result.records.len(), 1);
        let r = &result.records[0];
        assert_eq!(r.number, 1);
        assert_eq!(r.headline, "Example Title");
        assert_eq!(r.link, "https://example.com");
        assert_eq!(r.origin, Origin::Web);
        assert_eq!(r.occurrences, 3);
        assert_eq!(r.category, Category::NotApplicable);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scenario_no_heading() {
        let ext = CitationExtractor::new();
        let text = "Body cites [1].\n[1] [Internal] Wholesale Price Index: https://eaindustry.nic.in/download_data_1112.asp";
        let result = ext.extract_from_text(text).unwrap();
        assert_eq!(result.section_strategy, SectionStrategy::WholeDocument);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].category, Category::Sql);
        assert_eq!(result.records[0].occurrences, 2);
    }

    #[test]
    fn test_gap_between_parsed_entries() {
        let ext = CitationExtractor::new();
        let text = "Text [1] [3].\nReferences\n[1] [Web] One: https://one.org\n[3] [Internal] Three: https://three.org";
        let result = ext.extract_from_text(text).unwrap();
        let numbers: Vec<u32> = result.records.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        let two = &result.records[1];
        assert_eq!(two.headline, "Missing citation");
        assert_eq!(two.source, RecordSource::Placeholder);
        assert_eq!(two.category, Category::Vector);
        assert_eq!(two.occurrences, 0);
    }

    #[test]
    fn test_custom_allow_list() {
        let config = ParsingConfigBuilder::new()
            .add_sql_url("https://stats.example.org/table-1".to_string())
            .build()
            .unwrap();
        let ext = CitationExtractor::with_config(config);
        let text = "References\n[1] [Internal] Table one: https://stats.example.org/table-1";
        let result = ext.extract_from_text(text).unwrap();
        assert_eq!(result.records[0].category, Category::Sql);
        assert_eq!(result.metrics.sql_citations, 1);
    }
}
