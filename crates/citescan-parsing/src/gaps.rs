use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use citescan_core::{Origin, RecordSource};

use crate::citation::CitationCandidate;
use crate::config::ParsingConfig;
use crate::text_processing::{collapse_whitespace, strip_whitespace};

static BARE_BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").unwrap());

/// Fallback grammars for a citation number the primary parser missed,
/// from strictest to loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackGrammar {
    /// `[n] [Tag] Headline: URL`
    InlineUrl,
    /// `[n] [Tag] Headline` then the URL at the start of the next line
    NextLineUrl,
    /// `[n] [Tag] Headline:` at the very end of the section
    TrailingColon,
    /// `[n] [Tag] Headline` with an optional URL fragment
    HeadlineOnly,
}

impl FallbackGrammar {
    /// Try order; the first grammar that matches wins.
    pub const ORDER: [FallbackGrammar; 4] = [
        FallbackGrammar::InlineUrl,
        FallbackGrammar::NextLineUrl,
        FallbackGrammar::TrailingColon,
        FallbackGrammar::HeadlineOnly,
    ];

    fn pattern(self, number: u32) -> String {
        match self {
            FallbackGrammar::InlineUrl => {
                format!(r"(?is)\[{number}\]\s*\[([^\]]+)\]\s*([^:]+):\s*(https?://\S+)")
            }
            FallbackGrammar::NextLineUrl => {
                format!(r"(?is)\[{number}\]\s*\[([^\]]+)\]\s*(.+?)\n(https?://\S+)")
            }
            FallbackGrammar::TrailingColon => {
                format!(r"(?is)\[{number}\]\s*\[([^\]]+)\]\s*([^:]+):\s*$")
            }
            FallbackGrammar::HeadlineOnly => {
                format!(r"(?is)\[{number}\]\s*\[([^\]]+)\]\s*(.+?)(?:\s*https?://[^\s)]+)?")
            }
        }
    }

    /// Whether the grammar captures the link itself (group 3).
    fn captures_link(self) -> bool {
        matches!(
            self,
            FallbackGrammar::InlineUrl | FallbackGrammar::NextLineUrl
        )
    }
}

/// Line-join patterns for a URL on the line after `[n] [Tag] Headline:`.
///
/// Anything these match is already matched by `InlineUrl`, so in practice
/// this lookup never succeeds after a headline-only grammar.
fn following_line_patterns(number: u32) -> [String; 2] {
    [
        format!(r"(?ism)\[{number}\]\s*\[([^\]]+)\]\s*([^:]+):\s*\n\s*(https?://\S+)"),
        format!(r"(?ism)\[{number}\]\s*\[([^\]]+)\]\s*([^:]+):\s*\n(https?://\S+)"),
    ]
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "fallback grammar failed to compile");
            None
        }
    }
}

/// Bare `[n]` numbers in the section, at most `cap`.
pub fn bare_bracket_numbers(ref_text: &str, cap: u32) -> BTreeSet<u32> {
    BARE_BRACKET_RE
        .captures_iter(ref_text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .filter(|&n| n <= cap)
        .collect()
}

/// Every number that must end up with a record: the bare brackets plus the
/// whole `1..=max` range, so the final numbering has no interior gaps.
pub fn required_numbers(ref_text: &str, cap: u32) -> BTreeSet<u32> {
    let mut numbers = bare_bracket_numbers(ref_text, cap);
    let max = numbers.last().copied().unwrap_or(0);
    numbers.extend(1..=max);
    numbers.remove(&0);
    numbers
}

/// Synthesize candidates for required numbers the primary parser did not produce.
pub fn fill_gaps(ref_text: &str, parsed: &BTreeSet<u32>) -> Vec<CitationCandidate> {
    fill_gaps_with_config(ref_text, parsed, &ParsingConfig::default())
}

/// Config-aware version of [`fill_gaps`].
pub(crate) fn fill_gaps_with_config(
    ref_text: &str,
    parsed: &BTreeSet<u32>,
    config: &ParsingConfig,
) -> Vec<CitationCandidate> {
    required_numbers(ref_text, config.max_citation_number)
        .into_iter()
        .filter(|n| !parsed.contains(n))
        .filter_map(|n| resolve_number(ref_text, n, config))
        .collect()
}

/// Run the fallback grammars for one number and apply the quality guard.
fn resolve_number(ref_text: &str, number: u32, config: &ParsingConfig) -> Option<CitationCandidate> {
    let mut headline = config.placeholder_headline.clone();
    let mut link = String::new();
    let mut origin = Origin::Internal;
    let mut source = RecordSource::Placeholder;

    for grammar in FallbackGrammar::ORDER {
        let Some(re) = compile(&grammar.pattern(number)) else {
            continue;
        };
        let Some(caps) = re.captures(ref_text) else {
            continue;
        };

        let tag = caps.get(1).map_or("", |m| m.as_str());
        headline = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
        origin = if tag.contains("Web") {
            Origin::Web
        } else {
            Origin::Internal
        };
        link = if grammar.captures_link() {
            caps.get(3).map_or("", |m| m.as_str()).trim().to_string()
        } else {
            following_line_url(ref_text, number).unwrap_or_default()
        };
        source = RecordSource::GapFilled;
        tracing::trace!(number, ?grammar, "fallback grammar matched");
        break;
    }

    let headline = collapse_whitespace(&headline);
    if !passes_quality_guard(&headline, config.min_headline_chars) {
        tracing::debug!(number, headline, "discarding synthesized citation");
        return None;
    }

    tracing::debug!(number, ?source, "filled citation gap");
    Some(CitationCandidate {
        number,
        headline,
        link: strip_whitespace(&link),
        origin,
        source,
    })
}

fn following_line_url(ref_text: &str, number: u32) -> Option<String> {
    following_line_patterns(number).iter().find_map(|p| {
        let caps = compile(p)?.captures(ref_text)?;
        Some(caps.get(3)?.as_str().trim().to_string())
    })
}

/// Reject headlines that are too short or purely numeric.
pub(crate) fn passes_quality_guard(headline: &str, min_chars: usize) -> bool {
    let visible = headline.chars().filter(|c| !c.is_whitespace()).count();
    let all_digits = !headline.is_empty() && headline.chars().all(char::is_numeric);
    visible >= min_chars && !all_digits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaps(text: &str, parsed: &[u32]) -> Vec<CitationCandidate> {
        fill_gaps(text, &parsed.iter().copied().collect())
    }

    #[test]
    fn test_required_numbers_fill_range() {
        let numbers = required_numbers("[2] x [5] y [5]", 100);
        assert_eq!(numbers.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_required_numbers_cap() {
        let numbers = required_numbers("[3] and [250]", 100);
        assert_eq!(numbers.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(required_numbers("no brackets", 100).is_empty());
        assert!(required_numbers("[0]", 100).is_empty());
    }

    #[test]
    fn test_bare_number_becomes_placeholder() {
        let c = gaps("see [5] for details", &[1, 2, 3, 4]);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].number, 5);
        assert_eq!(c[0].headline, "Missing citation");
        assert_eq!(c[0].link, "");
        assert_eq!(c[0].origin, Origin::Internal);
        assert_eq!(c[0].source, RecordSource::Placeholder);
    }

    #[test]
    fn test_parsed_numbers_are_skipped() {
        assert!(gaps("[1] [2]", &[1, 2]).is_empty());
    }

    #[test]
    fn test_inline_url_grammar() {
        let text = "[1] [Web] Trade\nStatistics: https://trade.org/x";
        let c = gaps(text, &[]);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].headline, "Trade Statistics");
        assert_eq!(c[0].link, "https://trade.org/x");
        assert_eq!(c[0].origin, Origin::Web);
        assert_eq!(c[0].source, RecordSource::GapFilled);
    }

    #[test]
    fn test_next_line_url_grammar() {
        let text = "[1] [Internal] Consumer Price Index\nhttps://esankhyiki.mospi.gov.in/macroindicators?product=cpi";
        let c = gaps(text, &[]);
        assert_eq!(c[0].headline, "Consumer Price Index");
        assert_eq!(
            c[0].link,
            "https://esankhyiki.mospi.gov.in/macroindicators?product=cpi"
        );
        assert_eq!(c[0].origin, Origin::Internal);
    }

    #[test]
    fn test_trailing_colon_grammar() {
        let c = gaps("[1] [Web] Survey Results:\n", &[]);
        assert_eq!(c[0].headline, "Survey Results");
        assert_eq!(c[0].link, "");
        assert_eq!(c[0].origin, Origin::Web);
    }

    #[test]
    fn test_headline_only_grammar_is_discarded() {
        // The loosest grammar captures a single character, which the guard rejects
        let c = gaps("[1] [Web] Survey Results without colon", &[]);
        assert!(c.is_empty());
    }

    #[test]
    fn test_quality_guard() {
        assert!(passes_quality_guard("Missing citation", 3));
        assert!(passes_quality_guard("GDP", 3));
        assert!(!passes_quality_guard("a b", 3));
        assert!(!passes_quality_guard("2024", 3));
        assert!(!passes_quality_guard("", 3));
    }

    #[test]
    fn test_custom_placeholder_and_cap() {
        let config = crate::ParsingConfigBuilder::new()
            .placeholder_headline("Unresolved reference")
            .max_citation_number(3)
            .build()
            .unwrap();
        let c = fill_gaps_with_config("[2] and [9]", &BTreeSet::new(), &config);
        let numbers: Vec<u32> = c.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(c.iter().all(|e| e.headline == "Unresolved reference"));
    }

    #[test]
    fn test_placeholder_failing_guard_is_dropped() {
        let config = crate::ParsingConfigBuilder::new()
            .placeholder_headline("??")
            .build()
            .unwrap();
        assert!(fill_gaps_with_config("[1]", &BTreeSet::new(), &config).is_empty());
    }
}
