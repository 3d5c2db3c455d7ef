//! Implementation of `segregation filter` sub command.

use std::time::Instant;

use crate::common::{io::write_json, trace_rss_now};

/// Command line arguments for `segregation filter` sub command.
#[derive(clap::Parser, Debug)]
#[command(author, version, about = "Compute alleles to remove by segregation", long_about = None)]
pub struct Args {
    /// Path to the JSON snapshot of the store.
    #[arg(long, required = true)]
    pub path_store: String,
    /// Path to the query JSON with candidate alleles and filter config.
    #[arg(long, required = true)]
    pub path_query: String,
    /// Path to the output JSON file.
    #[arg(long, required = true)]
    pub path_output: String,
    /// Optional path to the settings JSON file.
    #[arg(long)]
    pub path_settings: Option<String>,
}

/// Main entry point for `segregation filter` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);

    let query = super::load_query(&args.path_query)?;
    let filter = super::load_filter(&args.path_store, args.path_settings.as_deref())?;

    trace_rss_now();

    tracing::info!("Running filter...");
    let before_filter = Instant::now();
    let output = filter.filter_alleles(&query.analysis_allele_ids, &query.filter_config)?;
    tracing::info!("... done running filter in {:?}", before_filter.elapsed());
    tracing::info!(
        "summary: {} alleles filtered out in {} analyses, {} analyses failed",
        output.filtered_out.values().map(|ids| ids.len()).sum::<usize>(),
        output.filtered_out.len(),
        output.failed.len()
    );

    write_json(&args.path_output, &output)?;

    trace_rss_now();

    tracing::info!(
        "All of `segregation filter` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
