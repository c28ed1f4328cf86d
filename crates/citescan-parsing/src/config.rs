use regex::Regex;

use citescan_core::config_file::ConfigFile;
use citescan_core::{Classifier, DEFAULT_SQL_URLS, MISSING_CITATION};

/// Hard upper bound for [`ParsingConfig::max_citation_number`]. Larger
/// configured values are clamped to this.
pub const MAX_CITATION_CEILING: u32 = 1000;

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for the citation extraction pipeline.
///
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── section.rs ──
    /// Heading patterns; the section starts right after the first match.
    pub(crate) section_header_patterns: ListOverride<Regex>,

    // ── gaps.rs ──
    /// Bare bracket numbers above this are ignored by the gap filler (default: 100).
    pub(crate) max_citation_number: u32,
    /// Synthesized headlines with fewer non-whitespace characters are discarded (default: 3).
    pub(crate) min_headline_chars: usize,
    /// Headline for numbers no fallback grammar could match.
    pub(crate) placeholder_headline: String,

    // ── classification ──
    /// URLs that mark an internal citation as a SQL source.
    pub(crate) sql_urls: ListOverride<String>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            section_header_patterns: ListOverride::Default,
            max_citation_number: 100,
            min_headline_chars: 3,
            placeholder_headline: MISSING_CITATION.to_string(),
            sql_urls: ListOverride::Default,
        }
    }
}

impl ParsingConfig {
    pub fn max_citation_number(&self) -> u32 {
        self.max_citation_number
    }

    pub fn min_headline_chars(&self) -> usize {
        self.min_headline_chars
    }

    pub fn placeholder_headline(&self) -> &str {
        &self.placeholder_headline
    }

    /// Freeze the configured allow-list into a [`Classifier`].
    pub fn classifier(&self) -> Classifier {
        let defaults: Vec<String> = DEFAULT_SQL_URLS.iter().map(|u| u.to_string()).collect();
        Classifier::with_urls(self.sql_urls.resolve(&defaults))
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    section_header_patterns: ListOverride<String>,
    max_citation_number: Option<u32>,
    min_headline_chars: Option<usize>,
    placeholder_headline: Option<String>,
    sql_urls: ListOverride<String>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the `[parsing]` and `[classification]` sections of a config file.
    pub fn from_config_file(file: &ConfigFile) -> Self {
        let mut builder = Self::new();
        if let Some(parsing) = &file.parsing {
            builder.max_citation_number = parsing.max_citation_number;
            builder.min_headline_chars = parsing.min_headline_chars;
            builder.placeholder_headline = parsing.placeholder_headline.clone();
        }
        if let Some(classification) = &file.classification
            && let Some(urls) = &classification.sql_urls
        {
            builder = if classification.replace_defaults.unwrap_or(false) {
                builder.set_sql_urls(urls.clone())
            } else {
                urls.iter().cloned().fold(builder, |b, url| b.add_sql_url(url))
            };
        }
        builder
    }

    // ── Section headings ──

    pub fn set_section_header_patterns(mut self, patterns: Vec<String>) -> Self {
        self.section_header_patterns = ListOverride::Replace(patterns);
        self
    }

    pub fn add_section_header_pattern(mut self, pattern: String) -> Self {
        match &mut self.section_header_patterns {
            ListOverride::Extend(v) => v.push(pattern),
            _ => self.section_header_patterns = ListOverride::Extend(vec![pattern]),
        }
        self
    }

    // ── Scalars ──

    pub fn max_citation_number(mut self, n: u32) -> Self {
        self.max_citation_number = Some(n);
        self
    }

    pub fn min_headline_chars(mut self, n: usize) -> Self {
        self.min_headline_chars = Some(n);
        self
    }

    pub fn placeholder_headline(mut self, headline: &str) -> Self {
        self.placeholder_headline = Some(headline.to_string());
        self
    }

    // ── SQL allow-list ──

    pub fn set_sql_urls(mut self, urls: Vec<String>) -> Self {
        self.sql_urls = ListOverride::Replace(urls);
        self
    }

    pub fn add_sql_url(mut self, url: String) -> Self {
        match &mut self.sql_urls {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(url),
            ListOverride::Default => self.sql_urls = ListOverride::Extend(vec![url]),
        }
        self
    }

    /// Compile all string patterns into regexes and produce a [`ParsingConfig`].
    ///
    /// `max_citation_number` is clamped to [`MAX_CITATION_CEILING`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let compile = |patterns: Vec<String>| -> Result<Vec<Regex>, regex::Error> {
            patterns.iter().map(|p| Regex::new(p)).collect()
        };

        let section_header_patterns = match self.section_header_patterns {
            ListOverride::Default => ListOverride::Default,
            ListOverride::Replace(p) => ListOverride::Replace(compile(p)?),
            ListOverride::Extend(p) => ListOverride::Extend(compile(p)?),
        };

        let mut max_citation_number = self.max_citation_number.unwrap_or(100);
        if max_citation_number > MAX_CITATION_CEILING {
            tracing::warn!(
                requested = max_citation_number,
                ceiling = MAX_CITATION_CEILING,
                "max citation number clamped"
            );
            max_citation_number = MAX_CITATION_CEILING;
        }

        Ok(ParsingConfig {
            section_header_patterns,
            max_citation_number,
            min_headline_chars: self.min_headline_chars.unwrap_or(3),
            placeholder_headline: self
                .placeholder_headline
                .unwrap_or_else(|| MISSING_CITATION.to_string()),
            sql_urls: self.sql_urls,
        })
    }
}
