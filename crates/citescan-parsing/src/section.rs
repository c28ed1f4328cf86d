use once_cell::sync::Lazy;
use regex::Regex;

use citescan_core::SectionStrategy;

use crate::config::ParsingConfig;

/// Default heading patterns, tried in order.
pub(crate) static DEFAULT_HEADER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?im)^[ \t]*references[ \t]*\r?\n").unwrap(),
        Regex::new(r"(?m)^[ \t]*REFERENCES[ \t]*\r?\n").unwrap(),
    ]
});

/// The slice of a document holding its reference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSection<'a> {
    pub text: &'a str,
    pub strategy: SectionStrategy,
}

/// Locate the references section in the document text.
///
/// Tries, in order:
/// 1. a line consisting of a "References" heading (any case), then a literal
///    "REFERENCES" heading; the section is everything after it
/// 2. everything after the last line containing "References" or "REFERENCES"
/// 3. the whole document, unchanged
pub fn find_references_section(text: &str) -> ReferenceSection<'_> {
    find_references_section_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`find_references_section`].
pub(crate) fn find_references_section_with_config<'a>(
    text: &'a str,
    config: &ParsingConfig,
) -> ReferenceSection<'a> {
    for re in config.section_header_patterns.resolve(&DEFAULT_HEADER_RES) {
        if let Some(m) = re.find(text) {
            return ReferenceSection {
                text: text[m.end()..].trim(),
                strategy: SectionStrategy::Heading,
            };
        }
    }

    if let Some(after) = after_last_mention(text) {
        return ReferenceSection {
            text: after.trim(),
            strategy: SectionStrategy::LastMention,
        };
    }

    ReferenceSection {
        text,
        strategy: SectionStrategy::WholeDocument,
    }
}

/// Text following the last line that mentions the heading word.
fn after_last_mention(text: &str) -> Option<&str> {
    let mut line_start = 0;
    let mut found = None;
    for line in text.split('\n') {
        let line_end = line_start + line.len();
        if line.contains("References") || line.contains("REFERENCES") {
            found = Some((line_end + 1).min(text.len()));
        }
        line_start = line_end + 1;
    }
    found.map(|start| &text[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_line() {
        let text = "Body [1].\n\nReferences\n[1] [Web] A: https://a.org\n";
        let section = find_references_section(text);
        assert_eq!(section.strategy, SectionStrategy::Heading);
        assert_eq!(section.text, "[1] [Web] A: https://a.org");
    }

    #[test]
    fn test_heading_case_insensitive() {
        let text = "Body.\nreferences  \n[1] [Web] A: https://a.org";
        let section = find_references_section(text);
        assert_eq!(section.strategy, SectionStrategy::Heading);
        assert!(section.text.starts_with("[1]"));

        let text = "Body.\nREFERENCES\n[2] [Internal] B: https://b.org";
        assert!(find_references_section(text).text.starts_with("[2]"));
    }

    #[test]
    fn test_inline_mention_is_not_a_heading() {
        // "References" inside a sentence falls through to the last-mention rule
        let text = "See the References below.\n[1] [Web] A: https://a.org";
        let section = find_references_section(text);
        assert_eq!(section.strategy, SectionStrategy::LastMention);
        assert_eq!(section.text, "[1] [Web] A: https://a.org");
    }

    #[test]
    fn test_last_mention_wins() {
        let text = "References are listed later.\nMore body.\n7. References and Notes\n[1] [Web] A: https://a.org";
        let section = find_references_section(text);
        assert_eq!(section.strategy, SectionStrategy::LastMention);
        assert!(section.text.starts_with("[1]"));
        assert!(!section.text.contains("More body"));
    }

    #[test]
    fn test_last_mention_on_final_line() {
        let text = "Body.\nReferences:";
        let section = find_references_section(text);
        assert_eq!(section.strategy, SectionStrategy::LastMention);
        assert_eq!(section.text, "");
    }

    #[test]
    fn test_no_heading_returns_whole_text() {
        let text = "  [1] [Web] A: https://a.org\n";
        let section = find_references_section(text);
        assert_eq!(section.strategy, SectionStrategy::WholeDocument);
        assert_eq!(section.text, text);
    }

    #[test]
    fn test_custom_header_pattern() {
        let config = crate::ParsingConfigBuilder::new()
            .set_section_header_patterns(vec![r"(?m)^Sources\n".to_string()])
            .build()
            .unwrap();
        let text = "Body.\nSources\n[1] [Web] A: https://a.org";
        let section = find_references_section_with_config(text, &config);
        assert_eq!(section.strategy, SectionStrategy::Heading);
        assert!(section.text.starts_with("[1]"));
    }
}
