use std::collections::BTreeMap;

use citescan_core::{CitationRecord, Classifier};

use crate::citation::CitationCandidate;
use crate::occurrences::OccurrenceIndex;

/// Keep one candidate per number.
///
/// The first candidate seen is kept unless a later one is strictly better:
/// a linked candidate beats a linkless one; otherwise (both linked, or both
/// linkless) the longer headline wins, ties going to the earlier candidate.
pub fn dedupe(candidates: Vec<CitationCandidate>) -> BTreeMap<u32, CitationCandidate> {
    let mut best: BTreeMap<u32, CitationCandidate> = BTreeMap::new();
    for candidate in candidates {
        let replace = best
            .get(&candidate.number)
            .is_none_or(|current| is_better(&candidate, current));
        if replace {
            best.insert(candidate.number, candidate);
        }
    }
    best
}

fn is_better(new: &CitationCandidate, current: &CitationCandidate) -> bool {
    match (new.link.is_empty(), current.link.is_empty()) {
        (false, true) => true,
        (true, false) => false,
        _ => new.headline.chars().count() > current.headline.chars().count(),
    }
}

/// Merge deduplicated parser output with gap-filled candidates into the final,
/// ascending record list.
///
/// Occurrences are counted over `full_text` and every record is classified
/// the same way regardless of which path produced it. Parsed entries win if
/// a gap-filled candidate ever shares their number.
pub fn assemble(
    parsed: BTreeMap<u32, CitationCandidate>,
    gap_filled: Vec<CitationCandidate>,
    full_text: &str,
    classifier: &Classifier,
) -> Vec<CitationRecord> {
    let mut merged = parsed;
    for candidate in gap_filled {
        merged.entry(candidate.number).or_insert(candidate);
    }

    let index = OccurrenceIndex::build(full_text);
    merged
        .into_values()
        .map(|c| CitationRecord {
            number: c.number,
            occurrences: index.count(c.number),
            category: classifier.classify(c.origin, &c.link),
            headline: c.headline,
            link: c.link,
            origin: c.origin,
            source: c.source,
        })
        .collect()
}
