use std::path::Path;

use thiserror::Error;

pub mod assembler;
pub mod citation;
pub mod config;
pub mod extractor;
pub mod gaps;
pub mod occurrences;
pub mod section;
pub mod text_processing;

pub use citation::CitationCandidate;
pub use config::{ListOverride, MAX_CITATION_CEILING, ParsingConfig, ParsingConfigBuilder};
pub use extractor::CitationExtractor;
pub use gaps::FallbackGrammar;
pub use section::ReferenceSection;
// Re-export domain types from core (canonical definitions live there)
pub use citescan_core::{
    BackendError, Category, CitationMetrics, CitationRecord, ExtractionResult, Origin,
    PlainTextBackend, RecordSource, SectionStrategy, TextBackend, ValidationWarning,
};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("no usable text in document")]
    NoUsableText,
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Extract citations from a document using the given backend for text extraction.
///
/// Pipeline:
/// 1. Extract text via `backend`
/// 2. Normalize extraction artifacts
/// 3. Locate the References section (falling back to the whole text)
/// 4. Parse `[n] [Tag] Headline: URL` entries and keep the best per number
/// 5. Fill numbering gaps with fallback grammars or placeholders
/// 6. Count occurrences over the full text, classify, sort
pub fn extract_citations(
    path: &Path,
    backend: &dyn TextBackend,
) -> Result<ExtractionResult, ParsingError> {
    CitationExtractor::new().extract_from_path(path, backend)
}
