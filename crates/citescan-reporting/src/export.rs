use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use citescan_core::{
    CitationMetrics, CitationRecord, ExtractionResult, SectionStrategy, ValidationWarning,
};

use crate::types::ExportFormat;

/// Column headers of the citation block.
pub const CITATION_COLUMNS: [&str; 6] = [
    "Citation Number",
    "Citation Headline",
    "Citation Link",
    "Web/Internal",
    "Total Occurrences",
    "Vector/SQL",
];

/// Column headers of the analytics block.
pub const METRIC_COLUMNS: [&str; 2] = ["Metric", "Value"];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render `result` in `format` and write it to `path`.
pub fn export_results(
    result: &ExtractionResult,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = match format {
        ExportFormat::Csv => export_csv(result),
        ExportFormat::Json => export_json(result)?,
        ExportFormat::Markdown => export_markdown(result),
    };

    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;
    Ok(())
}

fn csv_escape(s: &str) -> String {
    if s.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn citation_cells(r: &CitationRecord) -> [String; 6] {
    [
        r.number.to_string(),
        r.headline.clone(),
        r.link.clone(),
        r.origin.to_string(),
        r.occurrences.to_string(),
        r.category.to_string(),
    ]
}

/// Two side-by-side blocks separated by one empty column.
///
/// Left: one row per citation. Right: the 17 analytics rows. The body has
/// as many rows as the longer block; the shorter one is padded with empty
/// cells. Rows end with CRLF.
pub fn export_csv(result: &ExtractionResult) -> String {
    let analytics = result.metrics.analytics_rows();
    let rows = result.records.len().max(analytics.len());

    let mut out = String::new();
    let header: Vec<&str> = CITATION_COLUMNS
        .iter()
        .copied()
        .chain([""])
        .chain(METRIC_COLUMNS)
        .collect();
    push_csv_row(&mut out, header.iter().map(|h| csv_escape(h)));

    let separator = String::new();
    for i in 0..rows {
        let left = result
            .records
            .get(i)
            .map(citation_cells)
            .unwrap_or_default();
        let right = analytics
            .get(i)
            .map(|(name, value)| [name.to_string(), value.clone()])
            .unwrap_or_default();
        let cells = left
            .iter()
            .chain(std::iter::once(&separator))
            .chain(right.iter())
            .map(|c| csv_escape(c));
        push_csv_row(&mut out, cells);
    }
    out
}

fn push_csv_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let line: Vec<String> = cells.collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

#[derive(Serialize)]
struct JsonPercentages {
    internal: f64,
    web: f64,
    vector: f64,
    sql: f64,
    na: f64,
}

#[derive(Serialize)]
struct JsonWarning<'a> {
    #[serde(flatten)]
    warning: &'a ValidationWarning,
    message: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    section_strategy: SectionStrategy,
    records: &'a [CitationRecord],
    metrics: &'a CitationMetrics,
    percentages: JsonPercentages,
    warnings: Vec<JsonWarning<'a>>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn export_json(result: &ExtractionResult) -> Result<String, ExportError> {
    let m = &result.metrics;
    let report = JsonReport {
        section_strategy: result.section_strategy,
        records: &result.records,
        metrics: m,
        percentages: JsonPercentages {
            internal: round1(m.internal_pct()),
            web: round1(m.web_pct()),
            vector: round1(m.vector_pct()),
            sql: round1(m.sql_pct()),
            na: round1(m.na_pct()),
        },
        warnings: result
            .warnings
            .iter()
            .map(|w| JsonWarning {
                warning: w,
                message: w.to_string(),
            })
            .collect(),
    };
    let mut out = serde_json::to_string_pretty(&report)?;
    out.push('\n');
    Ok(out)
}

fn md_escape(s: &str) -> String {
    s.replace('|', "\\|")
}

pub fn export_markdown(result: &ExtractionResult) -> String {
    let mut out = String::from("# Citation Analysis\n\n");
    out.push_str(&format!(
        "**{}** citations | **{}** occurrences | references located by {}\n\n",
        result.metrics.total_citations,
        result.metrics.total_occurrences,
        result.section_strategy.as_str(),
    ));

    out.push_str("## Citations\n\n");
    if result.records.is_empty() {
        out.push_str("_No citations found._\n\n");
    } else {
        out.push_str(&format!("| {} |\n", CITATION_COLUMNS.join(" | ")));
        out.push_str(&format!("|{}\n", "---|".repeat(CITATION_COLUMNS.len())));
        for r in &result.records {
            let link = if r.link.is_empty() {
                String::new()
            } else {
                format!("<{}>", r.link)
            };
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                r.number,
                md_escape(&r.headline),
                md_escape(&link),
                r.origin,
                r.occurrences,
                r.category,
            ));
        }
        out.push('\n');
    }

    out.push_str("## Analytics\n\n| Metric | Value |\n|---|---|\n");
    for (name, value) in result.metrics.analytics_rows() {
        out.push_str(&format!("| {} | {} |\n", name, value));
    }

    if !result.warnings.is_empty() {
        out.push_str("\n## Validation Warnings\n\n");
        for w in &result.warnings {
            out.push_str(&format!("- {}\n", w));
        }
    }
    out
}
