use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static BRACKET_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\]").unwrap());

/// Count non-overlapping literal `[number]` tokens anywhere in `text`.
///
/// The reference list's own definition line counts too, so every listed
/// citation has at least one occurrence.
pub fn count_occurrences(number: u32, text: &str) -> usize {
    let token = format!("[{number}]");
    text.matches(token.as_str()).count()
}

/// Precomputed `[digits]` token counts for one document.
///
/// Equivalent to calling [`count_occurrences`] per number, but scans the
/// text once. Keys are the digit strings as written, so `[07]` never counts
/// toward `[7]`.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceIndex {
    counts: HashMap<String, usize>,
}

impl OccurrenceIndex {
    pub fn build(text: &str) -> Self {
        let mut counts = HashMap::new();
        for caps in BRACKET_TOKEN_RE.captures_iter(text) {
            if let Some(digits) = caps.get(1) {
                *counts.entry(digits.as_str().to_string()).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    pub fn count(&self, number: u32) -> usize {
        self.counts.get(&number.to_string()).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Growth [1] was strong [1][2]. Later [12] and [01].\nReferences\n[1] [Web] A: https://a.org\n[2] [Internal] B: https://b.org";

    #[test]
    fn test_count_literal_tokens() {
        assert_eq!(count_occurrences(1, DOC), 3);
        assert_eq!(count_occurrences(2, DOC), 2);
        assert_eq!(count_occurrences(12, DOC), 1);
        assert_eq!(count_occurrences(3, DOC), 0);
    }

    #[test]
    fn test_index_matches_direct_count() {
        let index = OccurrenceIndex::build(DOC);
        for n in 0..20 {
            assert_eq!(index.count(n), count_occurrences(n, DOC), "number {n}");
        }
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(count_occurrences(1, ""), 0);
        assert_eq!(OccurrenceIndex::build("").count(1), 0);
    }
}
