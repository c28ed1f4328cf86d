use std::io::Write;

use citescan_core::{Category, CitationMetrics, CitationRecord, ExtractionResult, ValidationWarning};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

/// Print the one-line extraction summary.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    file_name: &str,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    let m = &result.metrics;
    if color.enabled() {
        writeln!(
            w,
            "{} {}: {} citations, {} occurrences (references located by {})",
            "Extracted".bold().green(),
            file_name.bold(),
            m.total_citations,
            m.total_occurrences,
            result.section_strategy.as_str().dimmed(),
        )?;
    } else {
        writeln!(
            w,
            "Extracted {}: {} citations, {} occurrences (references located by {})",
            file_name,
            m.total_citations,
            m.total_occurrences,
            result.section_strategy.as_str(),
        )?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print the citation table.
pub fn print_records(
    w: &mut dyn Write,
    records: &[CitationRecord],
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(
        w,
        "{:>4}  {:<8}  {:<6}  {:>5}  {:<40}  Link",
        "#", "Origin", "Class", "Occ", "Headline"
    )?;
    for r in records {
        let class = format!("{:<6}", r.category.as_str());
        let class = if color.enabled() {
            match r.category {
                Category::Sql => class.cyan().to_string(),
                Category::Vector => class.magenta().to_string(),
                Category::NotApplicable => class.dimmed().to_string(),
            }
        } else {
            class
        };
        writeln!(
            w,
            "{:>4}  {:<8}  {}  {:>5}  {:<40}  {}",
            r.number,
            r.origin.as_str(),
            class,
            r.occurrences,
            truncate(&r.headline, 40),
            r.link,
        )?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print the analytics block.
pub fn print_metrics(
    w: &mut dyn Write,
    metrics: &CitationMetrics,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", "Analytics".bold())?;
    } else {
        writeln!(w, "Analytics")?;
    }
    for (name, value) in metrics.analytics_rows() {
        writeln!(w, "  {:<22} {:>8}", name, value)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print validation warnings, or a pass line when there are none.
pub fn print_validation(
    w: &mut dyn Write,
    warnings: &[ValidationWarning],
    color: ColorMode,
) -> std::io::Result<()> {
    if warnings.is_empty() {
        let msg = "Validation passed: Internal = SQL + Vector";
        if color.enabled() {
            writeln!(w, "{}", msg.green())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
        return Ok(());
    }
    for warning in warnings {
        let msg = format!("Warning: {}", warning);
        if color.enabled() {
            writeln!(w, "{}", msg.yellow())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
    }
    Ok(())
}

/// Print one record in the dry-run listing.
pub fn print_dry_run_record(
    w: &mut dyn Write,
    r: &CitationRecord,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", format!("[{}]", r.number).bold().yellow())?;
    } else {
        writeln!(w, "[{}]", r.number)?;
    }
    writeln!(w, "  Headline:    {}", r.headline)?;
    if !r.link.is_empty() {
        writeln!(w, "  Link:        {}", r.link)?;
    }
    writeln!(w, "  Origin:      {}", r.origin)?;
    writeln!(w, "  Class:       {}", r.category)?;
    writeln!(w, "  Occurrences: {}", r.occurrences)?;
    writeln!(w, "  Source:      {:?}", r.source)?;
    writeln!(w)?;
    Ok(())
}
