use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use receipt_parser::pipeline::{BatchReport, DocumentOutcome, LogProgress};
use receipt_parser::{load_config, MergeError, OutputError, ReceiptService};

#[derive(Parser)]
#[command(name = "receipt-parser", version, about = "Turn a folder of receipts into line-item spreadsheets")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, short, global = true, default_value = "receipt-parser.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every unprocessed document in the source folder
    Run,
    /// Combine all output tables into one
    Merge,
    /// Delete all per-document output tables
    Cleanup,
    /// List per-document output tables
    Outputs,
    /// Write all output tables into a ZIP archive
    Archive {
        /// Destination archive path
        path: PathBuf,
    },
}

fn init_logging() -> Result<()> {
    tracing_log::LogTracer::init().context("failed to bridge log records")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging()?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    // Only a run needs the store and extraction credentials.
    let service = match cli.command {
        Commands::Run => ReceiptService::from_config(&config)?,
        _ => ReceiptService::outputs_only(&config),
    };

    match cli.command {
        Commands::Run => {
            let report = service.run_pipeline(&LogProgress).await?;
            print_report(&report);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Merge => match service.merge() {
            Ok(summary) => {
                println!(
                    "Merged {} rows from {} files into {}",
                    summary.rows,
                    summary.sources.len(),
                    summary.path.display()
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(MergeError::NoOutputsAvailable) => {
                eprintln!("No parsed files available yet.");
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e.into()),
        },
        Commands::Cleanup => {
            let deleted = service.cleanup()?;
            println!("Deleted {} files", deleted.len());
            for name in deleted {
                println!("  {}", name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Outputs => {
            for name in service.list_outputs()? {
                println!("{}", name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Archive { path } => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            match service.archive_outputs(file) {
                Ok(count) => {
                    println!("Archived {} files into {}", count, path.display());
                    Ok(ExitCode::SUCCESS)
                }
                Err(OutputError::NoOutputsAvailable) => {
                    let _ = std::fs::remove_file(&path);
                    eprintln!("No parsed files available yet.");
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn print_report(report: &BatchReport) {
    println!(
        "Run {}: {} parsed, {} without data, {} failed, {} skipped",
        report.run_id,
        report.parsed_count(),
        report.no_data_count(),
        report.failed_count(),
        report.skipped_count()
    );

    for document in &report.documents {
        match &document.outcome {
            DocumentOutcome::Parsed { output_path, rows } => println!(
                "  {}: {} rows -> {}",
                document.document_name,
                rows,
                output_path.display()
            ),
            DocumentOutcome::NoData => println!("  {}: no line items", document.document_name),
            DocumentOutcome::Failed { error } => {
                println!("  {}: failed ({})", document.document_name, error)
            }
        }
    }
}
