//! cite-linker - turns author-year citations in a DOCX manuscript into links
//!
//! ```bash
//! cite-linker thesis.docx
//! cite-linker thesis.docx --output-dir out --heading Bibliography -v
//! ```
//!
//! Writes `<stem>_linked.docx` and `validation_report.txt` into the output
//! folder, which defaults to a folder named after the input file.

use anyhow::{Context, Result};
use cite_engine::{CorrelationSession, LinkSummary, LinkerConfig, ValidationReport};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const REPORT_FILE_NAME: &str = "validation_report.txt";

/// Link in-text citations to their reference entries
#[derive(Parser, Debug)]
#[command(name = "cite-linker", version, about)]
struct Cli {
    /// Manuscript to process (.docx)
    input: PathBuf,

    /// Folder for the linked document and report [default: input file stem]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// JSON file with linker options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text of the reference-section heading
    #[arg(long)]
    heading: Option<String>,

    /// Log every reference entry and rewritten paragraph
    #[arg(short, long)]
    verbose: bool,
}

/// Where the results of one run go
#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputPaths {
    dir: PathBuf,
    document: PathBuf,
    report: PathBuf,
}

impl OutputPaths {
    fn for_input(input: &Path, output_dir: Option<&Path>) -> Result<Self> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .with_context(|| format!("Input path has no file name: {}", input.display()))?;

        let dir = output_dir.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(stem));
        Ok(Self {
            document: dir.join(format!("{}_linked.docx", stem)),
            report: dir.join(REPORT_FILE_NAME),
            dir,
        })
    }
}

struct Outcome {
    paths: OutputPaths,
    references: usize,
    summary: LinkSummary,
    report: ValidationReport,
}

fn load_config(cli: &Cli) -> Result<LinkerConfig> {
    let mut config = match &cli.config {
        Some(path) => LinkerConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => LinkerConfig::default(),
    };
    if let Some(heading) = &cli.heading {
        config.heading_marker = heading.clone();
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = load_config(cli)?;
    let paths = OutputPaths::for_input(&cli.input, cli.output_dir.as_deref())?;

    tracing::info!("Loading {}", cli.input.display());
    let mut package = store::import_docx(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;

    let mut session = CorrelationSession::new(config).context("Invalid linker configuration")?;
    let references = session.scan_references(&mut package.tree)?;
    let summary = session.link_citations(&mut package.tree)?;
    let report = session.report();

    store::export_docx(&package, &paths.document)
        .with_context(|| format!("Failed to save {}", paths.document.display()))?;
    store::write_report(&paths.report, &report.render(&cli.input.display().to_string()))
        .with_context(|| format!("Failed to write {}", paths.report.display()))?;

    Ok(Outcome {
        paths,
        references,
        summary,
        report,
    })
}

fn print_summary(outcome: &Outcome) {
    println!("References indexed:  {}", outcome.references);
    println!("Citations linked:    {}", outcome.summary.links_created);
    println!("Broken citations:    {}", outcome.report.broken_count);
    println!("Unused references:   {}", outcome.report.unused.len());
    println!();
    println!("Linked document: {}", outcome.paths.document.display());
    println!("Report:          {}", outcome.paths.report.display());
    println!(
        "Generated at {}",
        outcome.report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(outcome) => {
            print_summary(&outcome);
            tracing::info!("Results written to {}", outcome.paths.dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
