//! leakhound CLI - detect sensitive struct fields flowing into Go logging
//! calls.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use leakhound::report::{self, Format, ReportedFinding};
use leakhound::{config, detector, loader};

/// Detect struct fields tagged `sensitive:"true"` being passed to logging
/// functions.
#[derive(Parser)]
#[command(
    name = "leakhound",
    version,
    about = "Find sensitive struct fields leaking into Go logging calls",
    long_about = r#"
leakhound analyzes Go packages and reports locations where data derived
from struct fields tagged with sensitive:"true" reaches a logging sink
(log/slog, log, fmt, or sinks configured in .leakhound.yaml).

Examples:
    leakhound ./...                      # analyze the current module
    leakhound --format=sarif ./...       # SARIF 2.1.0 on stdout
    leakhound --config=rules.yaml ./cmd  # extra third-party sinks
"#
)]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Path to the configuration file (default: .leakhound.yaml if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Package patterns: directories or recursive roots like ./...
    #[arg(required = true)]
    patterns: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Sarif,
}

impl From<OutputFormat> for Format {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Text => Format::Text,
            OutputFormat::Sarif => Format::Sarif,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(finding_count) => {
            if finding_count > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("leakhound: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<usize> {
    let cfg = config::load(cli.config.as_deref()).context("loading configuration")?;
    let passes = loader::load_packages(&cli.patterns).context("loading packages")?;
    let cwd = std::env::current_dir().context("resolving working directory")?;
    tracing::info!(packages = passes.len(), "analysis starting");

    // Each package analysis is independent; run them in parallel and keep
    // package order deterministic in the output.
    let per_package: Vec<Vec<ReportedFinding>> = passes
        .par_iter()
        .map(|pass| {
            let findings = match detector::analyze(pass, Some(&cfg)) {
                Ok(findings) => findings,
                Err(err) => {
                    eprintln!("leakhound: analysis failed for {}: {err}", pass.pkg);
                    return Vec::new();
                }
            };
            findings
                .into_iter()
                .map(|f| ReportedFinding {
                    path: display_path(pass.fset.name(f.pos.file), &cwd),
                    line: f.pos.line,
                    column: f.pos.column,
                    message: f.message,
                    rule: f.rule,
                })
                .collect()
        })
        .collect();

    let findings: Vec<ReportedFinding> = per_package.into_iter().flatten().collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::write_findings(&mut out, cli.format.into(), &findings)
        .context("writing findings")?;

    Ok(findings.len())
}

/// Render a path relative to the working directory when possible, for
/// stable report locations and SARIF fingerprints.
fn display_path(path: &std::path::Path, cwd: &std::path::Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .display()
        .to_string()
}
