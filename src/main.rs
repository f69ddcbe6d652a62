use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vertebra_norm::{plan_jobs, run_batch, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let batch = cli.batch_config();
    let config = cli.pipeline_config();

    if cli.dry_run {
        let (jobs, failures) = plan_jobs(&batch);
        for job in &jobs {
            println!("{}", job.input.display());
            println!("{}", job.output.display());
        }
        for failure in &failures {
            eprintln!("{} [{}]: {}", failure.path.display(), failure.kind, failure.message);
        }
        eprintln!("{} images planned", jobs.len());
        return Ok(());
    }

    let report = run_batch(&batch, &config);

    eprintln!();
    eprintln!("Processed: {}", report.processed);
    if !report.needs_review.is_empty() {
        eprintln!("Left unrotated, review manually: {}", report.needs_review.len());
        for path in &report.needs_review {
            eprintln!("  {}", path.display());
        }
    }

    if !report.is_clean() {
        eprintln!("Failed: {}", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {} [{}]: {}", failure.path.display(), failure.kind, failure.message);
        }
        bail!("{} of {} inputs failed", report.failures.len(), report.processed + report.failures.len());
    }

    Ok(())
}
