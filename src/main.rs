use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use markup_depth_lib::{analyze_batch, AnalysisRequest, AnalysisResponse, AnalyzerWorker, Dialect};

#[derive(Parser)]
#[command(name = "markup-depth")]
#[command(version, about = "Measure and reduce nesting depth in HTML, JSX and TSX markup")]
struct Cli {
    /// Files to analyze; reads stdin when none are given
    files: Vec<PathBuf>,

    /// Source dialect (html, jsx, tsx). Inferred from the file extension when omitted
    #[arg(long, short, env = "MARKUP_DEPTH_DIALECT")]
    dialect: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    #[arg(long, short)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every analysis succeeded.
fn run_cli() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let requests = collect_requests(&cli)?;
    tracing::info!(inputs = requests.len(), "analyzing markup");

    let responses = match requests.as_slice() {
        [single] => {
            let worker = AnalyzerWorker::spawn().context("Failed to start analyzer worker")?;
            vec![worker.analyze(single.clone())]
        }
        many => analyze_batch(many),
    };

    for (label, response) in input_labels(&cli).iter().zip(&responses) {
        match &response.error {
            Some(error) => tracing::error!(input = %label, "{}", error),
            None => tracing::info!(input = %label, "analysis complete"),
        }
    }

    write_responses(&responses, cli.pretty)?;
    Ok(responses.iter().all(|r| r.success))
}

fn collect_requests(cli: &Cli) -> anyhow::Result<Vec<AnalysisRequest>> {
    if cli.files.is_empty() {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        let dialect = cli.dialect.clone().unwrap_or_else(|| Dialect::Html.to_string());
        return Ok(vec![AnalysisRequest::new(source, dialect)]);
    }

    cli.files
        .iter()
        .map(|path| {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let dialect = match &cli.dialect {
                Some(dialect) => dialect.clone(),
                None => dialect_for_path(path)?.to_string(),
            };
            Ok(AnalysisRequest::new(source, dialect))
        })
        .collect()
}

fn dialect_for_path(path: &Path) -> anyhow::Result<Dialect> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    Dialect::from_extension(extension).with_context(|| {
        format!(
            "Cannot infer dialect for {}; pass --dialect html|jsx|tsx",
            path.display()
        )
    })
}

fn input_labels(cli: &Cli) -> Vec<String> {
    if cli.files.is_empty() {
        return vec!["<stdin>".to_string()];
    }
    cli.files.iter().map(|p| p.display().to_string()).collect()
}

fn write_responses(responses: &[AnalysisResponse], pretty: bool) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match (responses, pretty) {
        ([single], true) => serde_json::to_writer_pretty(&mut out, single)?,
        ([single], false) => serde_json::to_writer(&mut out, single)?,
        (many, true) => serde_json::to_writer_pretty(&mut out, many)?,
        (many, false) => serde_json::to_writer(&mut out, many)?,
    }
    writeln!(out)?;
    Ok(())
}
