//! Implementation of `segregation results` sub command.

use std::time::Instant;

use crate::common::{io::write_json, trace_rss_now};

/// Command line arguments for `segregation results` sub command.
#[derive(clap::Parser, Debug)]
#[command(author, version, about = "Compute inheritance categories of alleles", long_about = None)]
pub struct Args {
    /// Path to the JSON snapshot of the store.
    #[arg(long, required = true)]
    pub path_store: String,
    /// Path to the query JSON with candidate alleles.
    #[arg(long, required = true)]
    pub path_query: String,
    /// Path to the output JSON file.
    #[arg(long, required = true)]
    pub path_output: String,
    /// Optional path to the settings JSON file.
    #[arg(long)]
    pub path_settings: Option<String>,
}

/// Main entry point for `segregation results` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let query = super::load_query(&args.path_query)?;
    let filter = super::load_filter(&args.path_store, args.path_settings.as_deref())?;

    trace_rss_now();

    tracing::info!("Computing segregation results...");
    let before_results = Instant::now();
    let output = filter.get_segregation_results(&query.analysis_allele_ids)?;
    tracing::info!(
        "... done computing segregation results in {:?}",
        before_results.elapsed()
    );
    if !output.failed.is_empty() {
        tracing::warn!("{} analyses failed", output.failed.len());
    }

    write_json(&args.path_output, &output)?;

    tracing::info!(
        "All of `segregation results` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
