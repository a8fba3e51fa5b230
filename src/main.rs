//! Command-line driver: runs the RIS and PubMed paths and prints their reports.

use anyhow::{Context, Result};
use citedup::{IdentifierIndex, PubMedRun, Report, RisRun, Settings};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Deduplicate RIS and PubMed citation exports by DOI
#[derive(Parser, Debug)]
#[command(name = "citedup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deduplicate RIS and PubMed citation exports by DOI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path (defaults to ./citedup.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the input exports
    #[arg(long, global = true)]
    input_dir: Option<PathBuf>,

    /// Directory receiving the output partitions
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Parse input files concurrently
    #[arg(long, global = true)]
    parallel: bool,

    /// Report format
    #[arg(long, short, value_enum, global = true, default_value_t = ReportFormat::Table)]
    format: ReportFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for the run summary
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ReportFormat {
    /// Grid table (human-readable)
    Table,
    /// JSON (machine-readable)
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge RIS exports, keeping the longest abstract per DOI
    Ris {
        /// Keep a trailing record that has no `ER  -` line
        #[arg(long)]
        keep_unterminated: bool,
    },
    /// Filter PubMed exports against DOIs already in the RIS output
    Pubmed {
        /// RIS file seeding the known-DOI index
        #[arg(long, conflicts_with = "no_index")]
        index: Option<PathBuf>,

        /// Start with an empty known-DOI index
        #[arg(long)]
        no_index: bool,
    },
    /// Run the RIS merge, then filter PubMed against its output
    All {
        /// Keep a trailing RIS record that has no `ER  -` line
        #[arg(long)]
        keep_unterminated: bool,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("citedup={level}")),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::discover(cli.config.as_deref())?;
    if let Some(dir) = &cli.input_dir {
        settings.input_dir.clone_from(dir);
    }
    if let Some(dir) = &cli.output_dir {
        settings.output_dir.clone_from(dir);
    }
    settings.parallel |= cli.parallel;
    Ok(settings)
}

fn print_report(report: &Report, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Table => println!("{}", report.render_table()),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn run_ris(settings: &Settings) -> Result<Report> {
    let run = RisRun::from_settings(settings)?;
    if run.inputs.is_empty() {
        tracing::warn!(
            dir = %settings.input_dir.display(),
            pattern = %settings.ris.pattern,
            "no RIS input files found"
        );
    }
    run.execute().context("RIS run failed")
}

fn run_pubmed(settings: &Settings, index: IdentifierIndex) -> Result<Report> {
    let run = PubMedRun::from_settings(settings, index)?;
    if run.inputs.is_empty() {
        tracing::warn!(
            dir = %settings.input_dir.display(),
            pattern = %settings.pubmed.pattern,
            "no PubMed input files found"
        );
    }
    run.execute().context("PubMed run failed")
}

fn load_index(path: &std::path::Path) -> Result<IdentifierIndex> {
    IdentifierIndex::from_ris_path(path)
        .with_context(|| format!("cannot load DOI index from {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut settings = load_settings(&cli)?;

    match &cli.command {
        Commands::Ris { keep_unterminated } => {
            settings.ris.keep_unterminated |= *keep_unterminated;
            print_report(&run_ris(&settings)?, cli.format)?;
        },
        Commands::Pubmed { index, no_index } => {
            let index = if *no_index {
                IdentifierIndex::new()
            } else {
                let path = index.clone().unwrap_or_else(|| settings.pubmed_index_path());
                load_index(&path)?
            };
            print_report(&run_pubmed(&settings, index)?, cli.format)?;
        },
        Commands::All { keep_unterminated } => {
            settings.ris.keep_unterminated |= *keep_unterminated;
            print_report(&run_ris(&settings)?, cli.format)?;

            let index = load_index(&settings.pubmed_index_path())?;
            print_report(&run_pubmed(&settings, index)?, cli.format)?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_ris() {
        let cli = Cli::try_parse_from(["citedup", "-vv", "ris", "--keep-unterminated"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Ris {
                keep_unterminated: true
            }
        ));
        assert_eq!(cli.format, ReportFormat::Table);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "citedup",
            "pubmed",
            "--no-index",
            "--format",
            "json",
            "--input-dir",
            "data",
        ])
        .unwrap();
        assert_eq!(cli.format, ReportFormat::Json);
        assert_eq!(cli.input_dir, Some(PathBuf::from("data")));
        assert!(matches!(cli.command, Commands::Pubmed { no_index: true, .. }));
    }

    #[test]
    fn test_cli_index_conflicts_with_no_index() {
        let result =
            Cli::try_parse_from(["citedup", "pubmed", "--index", "x.ris", "--no-index"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["citedup"]).is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from([
            "citedup",
            "--config",
            "/nonexistent/citedup.toml",
            "ris",
        ])
        .unwrap();
        assert!(load_settings(&cli).is_err());
    }

    #[test]
    fn test_cli_overrides_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("citedup.toml");
        std::fs::write(&config, "input_dir = \"from-file\"\noutput_dir = \"from-file\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "citedup",
            "--config",
            config.to_str().unwrap(),
            "--output-dir",
            "out",
            "--parallel",
            "ris",
        ])
        .unwrap();
        let settings = load_settings(&cli).unwrap();

        assert_eq!(settings.input_dir, PathBuf::from("from-file"));
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert!(settings.parallel);
    }
}
