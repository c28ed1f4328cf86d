use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod classify;
pub mod config_file;
pub mod metrics;

pub use classify::{Classifier, DEFAULT_SQL_URLS};
pub use metrics::{CitationMetrics, ValidationWarning};

/// Headline used for numbers that were seen as bare brackets but never parsed.
pub const MISSING_CITATION: &str = "Missing citation";

/// Whether a citation was tagged as an external web source or an internal data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Web,
    Internal,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Web => "Web",
            Origin::Internal => "Internal",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a citation link.
///
/// `NotApplicable` is reserved for web citations; internal citations are
/// either `Sql` (link is a known tabular source) or `Vector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Vector,
    #[serde(rename = "SQL")]
    Sql,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vector => "Vector",
            Category::Sql => "SQL",
            Category::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which extraction path produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Matched by the primary `[n] [Tag] Headline: URL` grammar.
    Parsed,
    /// Recovered by one of the fallback grammars.
    GapFilled,
    /// No grammar matched; headline is [`MISSING_CITATION`].
    Placeholder,
}

/// A single numbered entry from the references section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    pub number: u32,
    pub headline: String,
    pub link: String,
    pub origin: Origin,
    /// Literal `[number]` occurrences across the whole document text,
    /// including the definition line in the reference list.
    pub occurrences: usize,
    pub category: Category,
    pub source: RecordSource,
}

/// How the references section was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStrategy {
    /// A line consisting of a "References" heading.
    Heading,
    /// Everything after the last line mentioning "References".
    LastMention,
    /// No heading found; the whole document is scanned.
    WholeDocument,
}

impl SectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionStrategy::Heading => "heading",
            SectionStrategy::LastMention => "last mention",
            SectionStrategy::WholeDocument => "whole document",
        }
    }
}

/// Result of running the extraction pipeline over one document.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Records sorted ascending by number, one per number.
    pub records: Vec<CitationRecord>,
    pub metrics: CitationMetrics,
    pub section_strategy: SectionStrategy,
    /// Non-fatal consistency problems found in `metrics`.
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for document text extraction backends.
///
/// Implementors turn a file on disk into a single text string; the citation
/// pipeline itself lives in `citescan-parsing`.
pub trait TextBackend: Send + Sync {
    /// Extract the full text content of a document.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}

/// Backend for documents that are already plain text.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextBackend;

impl TextBackend for PlainTextBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
