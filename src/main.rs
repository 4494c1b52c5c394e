use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use jobharvest::cli::{self, Args};
use jobharvest::config::CONFIG;
use jobharvest::export::{self, ExportFormat};
use jobharvest::pipeline::{Pipeline, RunSummary};
use jobharvest::progress::TracingObserver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let args = Args::parse();
    let request = args.to_request()?;
    let format = ExportFormat::from(args.format);

    if request.exceeds_caution() {
        tracing::warn!(
            count = request.target_count(),
            "collecting more than 100 jobs may be slow and could trigger rate limiting"
        );
        if !args.yes {
            bail!("re-run with --yes to collect {} jobs", request.target_count());
        }
    }

    let output = match &args.output {
        Some(path) => {
            let name = path.to_string_lossy();
            PathBuf::from(export::normalize_filename(&name, format))
        }
        None => PathBuf::from(export::default_filename(&request, chrono::Local::now(), format)),
    };
    cli::print_search_summary(&request, &output);

    let pipeline = Pipeline::new(&CONFIG).context("failed to set up the scraper")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, finishing with what has been collected");
                cancel.cancel();
            }
        }
    });

    let report = pipeline.run_until(&request, &TracingObserver, &cancel).await;

    cli::print_outcome(&report);
    if report.records.is_empty() {
        match report.summary() {
            RunSummary::SearchFailed => println!("Nothing to save. Check the network or retry later."),
            _ => println!("Nothing to save. Check the search criteria."),
        }
        return Ok(());
    }

    cli::print_sample(&report.records);
    let saved = export::save(&output, &report.records, format)
        .with_context(|| format!("failed to save results to {}", output.display()))?;
    println!();
    println!("Results saved to {}", saved.display());
    Ok(())
}
