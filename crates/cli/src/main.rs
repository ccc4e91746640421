//! RunLens CLI - metrics and comparisons for task-execution runs.

mod export;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use runlens_compare::{compare_runs, resolve_labels};
use runlens_metrics::{check_completion, MetricsExtractor};
use runlens_report::{JsonRenderer, MarkdownRenderer, Renderer, Report};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::export::{export_run, ExportConfig};

#[derive(Parser)]
#[command(name = "runlens")]
#[command(about = "Extract and compare metrics from task-execution runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report metrics for one or more runs; two runs also get deltas
    Compare {
        /// Run databases, baseline first
        #[arg(required = true)]
        databases: Vec<PathBuf>,
        /// Comma-separated labels, one per database
        #[arg(long)]
        labels: Option<String>,
        /// Emit JSON instead of Markdown
        #[arg(long)]
        json: bool,
        /// Write to PREFIX.md / PREFIX.json instead of stdout
        #[arg(short, long, value_name = "PREFIX")]
        output: Option<PathBuf>,
    },
    /// Show whether a run has finished
    Status {
        /// Run database
        database: PathBuf,
    },
    /// Export raw task, worker, transition, timeline and dependency data
    Export {
        /// Run database
        database: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    // Logs go to stderr so reports on stdout stay clean.
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compare {
            databases,
            labels,
            json,
            output,
        } => {
            let labels = resolve_labels(databases.as_slice(), labels.as_deref())?;
            let extractor = MetricsExtractor::new();

            let mut runs = Vec::with_capacity(databases.len());
            for (path, label) in databases.iter().zip(&labels) {
                match extractor.extract(path, label).await {
                    Ok(snapshot) => runs.push(snapshot),
                    Err(e) => error!("Skipping {} ({}): {}", label, path.display(), e),
                }
            }
            if runs.is_empty() {
                bail!("no run could be extracted");
            }

            let comparison = compare_runs(&runs);
            let renderer: &dyn Renderer = if json {
                &JsonRenderer
            } else {
                &MarkdownRenderer
            };
            let text = renderer.render(&Report {
                runs: &runs,
                comparison: comparison.as_ref(),
            })?;

            match output {
                Some(prefix) => {
                    let path = PathBuf::from(format!(
                        "{}.{}",
                        prefix.display(),
                        renderer.extension()
                    ));
                    std::fs::write(&path, text)?;
                    info!("Report written to {}", path.display());
                }
                None => println!("{}", text),
            }
        }
        Commands::Status { database } => {
            let status = check_completion(&database).await?;

            println!("Run: {}", database.display());
            for (raw, count) in &status.counts {
                println!("  {:<12} {}", raw, count);
            }
            println!(
                "Total: {}  Terminal: {}  Non-terminal: {}",
                status.total, status.terminal, status.non_terminal
            );
            println!(
                "Complete: {}",
                if status.is_complete() { "yes" } else { "no" }
            );
        }
        Commands::Export { database, output } => {
            let config = match output {
                Some(output_dir) => ExportConfig { output_dir },
                None => ExportConfig::default(),
            };

            let written = export_run(&database, &config).await?;
            println!("Exported {} files to {}", written.len(), config.output_dir.display());
        }
    }

    Ok(())
}
