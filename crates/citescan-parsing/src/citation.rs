use once_cell::sync::Lazy;
use regex::Regex;

use citescan_core::{Origin, RecordSource};

use crate::text_processing::{collapse_whitespace, strip_whitespace};

/// `[N] [TAG] HEADLINE:`; the tail (link) is delimited separately.
static ENTRY_HEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[(\d+)\]\s*\[([^\]]+)\]\s*([^:]+?):\s*").unwrap());

/// Same grammar pinned to entry 15, which the general scan has been seen to
/// swallow into the tail of entry 14.
static ENTRY_15_HEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[(15)\]\s*\[([^\]]+)\]\s*([^:]+?):\s*").unwrap());

/// Start of the next numbered entry.
static NEXT_ENTRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\[\d").unwrap());

/// A URL token; stops at `[` so a bracketed note on the next line is not glued on.
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\[\s]+").unwrap());

/// Marker some sources put in front of the URL, as it reads once whitespace is gone.
const GOVT_SOURCE_MARKER: &str = "Govtsource:";

/// A parsed entry before occurrence counting and classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationCandidate {
    pub number: u32,
    pub headline: String,
    pub link: String,
    pub origin: Origin,
    pub source: RecordSource,
}

/// Raw captures of one entry.
struct RawEntry<'a> {
    number: &'a str,
    tag: &'a str,
    headline: &'a str,
    tail: &'a str,
}

/// Find the first entry at or after `pos`; returns it with the offset where
/// scanning should resume.
fn entry_at<'a>(text: &'a str, head_re: &Regex, pos: usize) -> Option<(RawEntry<'a>, usize)> {
    let caps = head_re.captures_at(text, pos)?;
    let head_end = caps.get(0)?.end();
    let tail_end = NEXT_ENTRY_RE
        .find_at(text, head_end)
        .map_or(text.len(), |m| m.start());

    let entry = RawEntry {
        number: caps.get(1)?.as_str(),
        tag: caps.get(2)?.as_str(),
        headline: caps.get(3)?.as_str(),
        tail: &text[head_end..tail_end],
    };
    Some((entry, tail_end))
}

/// Non-overlapping entries, left to right. A tail's text is never rescanned.
fn scan_entries<'a>(text: &'a str, head_re: &Regex) -> Vec<RawEntry<'a>> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while let Some((entry, next)) = entry_at(text, head_re, pos) {
        entries.push(entry);
        if next >= text.len() {
            break;
        }
        pos = next;
    }
    entries
}

/// Extract every well-formed `[n] [Tag] Headline: URL` entry, in document order.
///
/// Duplicates are kept; see [`crate::assembler::dedupe`] for conflict resolution.
/// URLs may wrap over several physical lines.
pub fn parse_primary(ref_text: &str) -> Vec<CitationCandidate> {
    let mut entries = scan_entries(ref_text, &ENTRY_HEAD_RE);

    if !entries.iter().any(|e| e.number == "15")
        && let Some((entry, _)) = entry_at(ref_text, &ENTRY_15_HEAD_RE, 0)
    {
        tracing::debug!("recovered entry 15 with the pinned grammar");
        entries.push(entry);
    }

    entries.into_iter().filter_map(to_candidate).collect()
}

fn to_candidate(entry: RawEntry<'_>) -> Option<CitationCandidate> {
    let number = match entry.number.parse::<u32>() {
        Ok(n) if n >= 1 => n,
        _ => {
            tracing::trace!(number = entry.number, "citation number out of range");
            return None;
        }
    };

    let link = clean_link(entry.tail);
    let origin = primary_origin(entry.tag, &link);

    Some(CitationCandidate {
        number,
        headline: collapse_whitespace(entry.headline),
        link,
        origin,
        source: RecordSource::Parsed,
    })
}

/// Turn a possibly wrapped URL tail into a single link.
///
/// Whitespace is removed and the `Govt source:` marker dropped. When an
/// `http(s)://` token is present it is kept from there on; otherwise the
/// cleaned tail is returned as-is.
pub(crate) fn clean_link(tail: &str) -> String {
    let stripped = strip_whitespace(tail);
    let stripped = if stripped.contains(GOVT_SOURCE_MARKER) {
        stripped.replace(GOVT_SOURCE_MARKER, "")
    } else {
        stripped
    };
    match URL_RE.find(&stripped) {
        Some(m) => m.as_str().to_string(),
        None => stripped,
    }
}

/// Origin from the entry tag, falling back to whether a link is present.
fn primary_origin(tag: &str, link: &str) -> Origin {
    if tag.contains("Web") {
        Origin::Web
    } else if tag.contains("Internal") {
        Origin::Internal
    } else if !link.is_empty() {
        Origin::Web
    } else {
        Origin::Internal
    }
}
