//! Command line interface of the segregation filter.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
    common::io::read_json,
    segregation::{
        conf::{FilterConfig, Settings},
        filter::{AnalysisAlleleIds, SegregationFilter},
        storage::SnapshotStore,
    },
};

pub mod filter;
pub mod results;

/// Query read from the `--path-query` file.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
#[serde(default)]
pub struct Query {
    /// Candidate alleles per analysis.
    pub analysis_allele_ids: AnalysisAlleleIds,
    /// Enabled categories, only used by `segregation filter`.
    pub filter_config: FilterConfig,
}

/// Load the query from `path_query`.
fn load_query(path_query: &str) -> Result<Query, anyhow::Error> {
    tracing::info!("Loading query...");
    let query: Query = read_json(path_query)?;
    tracing::info!(
        "... done loading query with {} analyses",
        query.analysis_allele_ids.len()
    );
    Ok(query)
}

/// Load the snapshot store and settings and construct the filter.
fn load_filter(
    path_store: &str,
    path_settings: Option<&str>,
) -> Result<SegregationFilter<SnapshotStore>, anyhow::Error> {
    let settings: Settings = match path_settings {
        Some(path) => read_json(path)?,
        None => Settings::default(),
    };
    tracing::info!("settings = {:?}", &settings);

    tracing::info!("Loading store...");
    let before_loading = Instant::now();
    let store = SnapshotStore::from_path(path_store)?;
    tracing::info!("...done loading store in {:?}", before_loading.elapsed());

    Ok(SegregationFilter::new(store, settings)?)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn load_query_fixture() -> Result<(), anyhow::Error> {
        let query = load_query("tests/segregation/query.json")?;

        assert_eq!(query.analysis_allele_ids.len(), 2);
        assert_eq!(query.analysis_allele_ids[&2], vec![1]);
        assert_eq!(query.filter_config, FilterConfig::all_enabled());

        Ok(())
    }

    #[test]
    fn load_filter_invalid_settings() {
        let res = load_filter(
            "tests/segregation/store.json",
            Some("tests/segregation/missing.json"),
        );

        assert!(res.is_err());
    }
}
