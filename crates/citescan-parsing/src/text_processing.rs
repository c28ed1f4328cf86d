use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());
static CASE_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static SENTENCE_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])([A-Z])").unwrap());
static CITATION_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d+)\]\s*\[([^\]]+)\]\s*([^:]+):\s*(https?://[^\s]+)").unwrap()
});
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Repair common text-extraction artifacts.
///
/// Applied in order:
/// 1. runs of three or more blank-line-separated newlines collapse to one blank line
/// 2. `wordWord` → `word Word` (words merged across a line break)
/// 3. `end.Next` → `end. Next`
/// 4. `[n]  [Tag]Headline:  URL` → `[n] [Tag] Headline: URL`
///
/// Idempotent: normalizing already-normalized text changes nothing.
pub fn normalize(text: &str) -> String {
    let text = BLANK_RUN_RE.replace_all(text, "\n\n");
    let text = CASE_BOUNDARY_RE.replace_all(&text, "${1} ${2}");
    let text = SENTENCE_BOUNDARY_RE.replace_all(&text, "${1} ${2}");
    CITATION_LINE_RE
        .replace_all(&text, "[${1}] [${2}] ${3}: ${4}")
        .into_owned()
}

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Trim and collapse every whitespace run (newlines included) to one space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WS_RE.replace_all(text.trim(), " ").into_owned()
}

/// Remove all whitespace; links must never contain breaks or spaces.
pub(crate) fn strip_whitespace(text: &str) -> String {
    WS_RE.replace_all(text, "").into_owned()
}
