use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use citescan_core::config_file::{self, ConfigFile};
use citescan_parsing::{CitationExtractor, ParsingConfigBuilder, ParsingError};
use citescan_reporting::{ExportFormat, export_results};

mod output;

use output::ColorMode;

/// Citation scanner - extract bracketed citations from reports and classify
/// their sources as Web, Vector or SQL
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract citations from a PDF or text file and export them
    Extract {
        /// Path to the PDF, .txt or .md file
        file_path: PathBuf,

        /// Export format: csv, json or markdown
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Output path (default: next to the input file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Explicit config file, overlaid on the platform and local configs
        #[arg(long)]
        config: Option<PathBuf>,

        /// Highest citation number forced into the result (clamped to 1000)
        #[arg(long)]
        max_citation: Option<u32>,
    },

    /// Print the located references and every record without writing files
    DryRun {
        /// Path to the PDF, .txt or .md file
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Explicit config file, overlaid on the platform and local configs
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            file_path,
            format,
            output,
            no_color,
            config,
            max_citation,
        } => extract(file_path, format, output, no_color, config, max_citation),
        Command::DryRun {
            file_path,
            no_color,
            config,
        } => dry_run(file_path, no_color, config),
    }
}

/// Resolve the config file. `--config` (or `CITESCAN_CONFIG`) overlays the
/// `./.citescan.toml` + platform cascade, and must exist and parse.
fn resolve_config(explicit: Option<PathBuf>) -> anyhow::Result<ConfigFile> {
    let base = config_file::load_config();
    let explicit =
        explicit.or_else(|| std::env::var("CITESCAN_CONFIG").ok().map(PathBuf::from));
    match explicit {
        Some(path) => {
            let overlay = config_file::read_config(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded explicit config");
            Ok(config_file::merge(base, overlay))
        }
        None => Ok(base),
    }
}

fn build_extractor(
    config: &ConfigFile,
    max_citation: Option<u32>,
) -> anyhow::Result<CitationExtractor> {
    let mut builder = ParsingConfigBuilder::from_config_file(config);
    if let Some(n) = max_citation {
        builder = builder.max_citation_number(n);
    }
    let parsing = builder
        .build()
        .context("Invalid section heading pattern in config")?;
    Ok(CitationExtractor::with_config(parsing))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<stem>_citations_with_vector_sql.csv` for CSV, `<stem>_citations.<ext>`
/// otherwise, next to the input.
fn default_output_path(input: &Path, format: ExportFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let name = match format {
        ExportFormat::Csv => format!("{stem}_citations_with_vector_sql.csv"),
        other => format!("{stem}_citations.{}", other.extension()),
    };
    input.with_file_name(name)
}

fn run_extraction(
    extractor: &CitationExtractor,
    file_path: &Path,
    show_spinner: bool,
) -> anyhow::Result<citescan_core::ExtractionResult> {
    use indicatif::{ProgressBar, ProgressStyle};

    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let spinner = if show_spinner {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Extracting citations from {}...", display_name(file_path)));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let backend = citescan_pdf::backend_for(file_path);
    let result = extractor.extract_from_path(file_path, &*backend);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match result {
        Ok(result) => Ok(result),
        Err(ParsingError::NoUsableText) => {
            anyhow::bail!("No usable text found in {}", file_path.display())
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to extract text from {}", file_path.display()))
        }
    }
}

fn extract(
    file_path: PathBuf,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    no_color: bool,
    config: Option<PathBuf>,
    max_citation: Option<u32>,
) -> anyhow::Result<()> {
    let color = ColorMode(!no_color);
    let config = resolve_config(config)?;

    // CLI flag > config file > CSV
    let format = match format {
        Some(f) => f,
        None => config
            .export
            .as_ref()
            .and_then(|e| e.format.as_deref())
            .map(str::parse::<ExportFormat>)
            .transpose()
            .context("Invalid [export] format in config")?
            .unwrap_or_default(),
    };

    let extractor = build_extractor(&config, max_citation)?;
    let result = run_extraction(&extractor, &file_path, color.enabled())?;

    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    output::print_extraction_summary(&mut w, &display_name(&file_path), &result, color)?;
    output::print_records(&mut w, &result.records, color)?;
    output::print_metrics(&mut w, &result.metrics, color)?;
    output::print_validation(&mut w, &result.warnings, color)?;

    let output_path = output.unwrap_or_else(|| default_output_path(&file_path, format));
    export_results(&result, format, &output_path)
        .with_context(|| format!("Failed to export {}", format))?;
    writeln!(w, "\n{} written to {}", format, output_path.display())?;
    tracing::info!(path = %output_path.display(), %format, "exported results");
    Ok(())
}

fn dry_run(file_path: PathBuf, no_color: bool, config: Option<PathBuf>) -> anyhow::Result<()> {
    use owo_colors::OwoColorize;

    let color = ColorMode(!no_color);
    let config = resolve_config(config)?;
    let extractor = build_extractor(&config, None)?;
    let result = run_extraction(&extractor, &file_path, false)?;

    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    let file_name = display_name(&file_path);
    if color.enabled() {
        writeln!(
            w,
            "{} {} ({} citations, references located by {})\n",
            "DRY RUN:".bold().cyan(),
            file_name.bold(),
            result.records.len(),
            result.section_strategy.as_str(),
        )?;
    } else {
        writeln!(
            w,
            "DRY RUN: {} ({} citations, references located by {})\n",
            file_name,
            result.records.len(),
            result.section_strategy.as_str(),
        )?;
    }

    for record in &result.records {
        output::print_dry_run_record(&mut w, record, color)?;
    }
    output::print_validation(&mut w, &result.warnings, color)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_csv() {
        let path = default_output_path(Path::new("/data/msme_report.pdf"), ExportFormat::Csv);
        assert_eq!(
            path,
            PathBuf::from("/data/msme_report_citations_with_vector_sql.csv")
        );
    }

    #[test]
    fn test_default_output_path_other_formats() {
        let input = Path::new("notes.txt");
        assert_eq!(
            default_output_path(input, ExportFormat::Json),
            PathBuf::from("notes_citations.json")
        );
        assert_eq!(
            default_output_path(input, ExportFormat::Markdown),
            PathBuf::from("notes_citations.md")
        );
    }

    #[test]
    fn test_cli_parses_extract_flags() {
        let cli = Cli::try_parse_from([
            "citescan",
            "extract",
            "report.pdf",
            "--format",
            "json",
            "--max-citation",
            "40",
            "--no-color",
        ])
        .unwrap();
        match cli.command {
            Command::Extract {
                format,
                max_citation,
                no_color,
                ..
            } => {
                assert_eq!(format, Some(ExportFormat::Json));
                assert_eq!(max_citation, Some(40));
                assert!(no_color);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(
            Cli::try_parse_from(["citescan", "extract", "a.pdf", "--format", "xlsx"]).is_err()
        );
    }

    #[test]
    fn test_max_citation_flag_overrides_config() {
        let extractor = build_extractor(&ConfigFile::default(), Some(7)).unwrap();
        assert_eq!(extractor.config().max_citation_number(), 7);
    }
}
