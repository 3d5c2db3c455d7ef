//! Access to samples, alleles, genotype calls and annotation.
//!
//! The filter only reads from the store.  `SnapshotStore` provides an in-memory
//! implementation that is loaded from a JSON file.

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    common::io::read_json,
    err::SegregationError,
    segregation::schema::{
        Allele, AlleleId, AnalysisId, AnnotationTranscript, GenotypeCall, Sample, SampleId,
    },
};

/// Read-only access to the data needed by the segregation filter.
pub trait SegregationStore {
    /// All samples of the given analysis.
    fn fetch_samples(&self, analysis_id: AnalysisId) -> Result<Vec<Sample>, SegregationError>;

    /// The allele records for `allele_ids`.
    fn fetch_alleles(&self, allele_ids: &[AlleleId]) -> Result<Vec<Allele>, SegregationError>;

    /// The genotype calls of `sample_ids` for `allele_ids`.
    ///
    /// This must include the calls where one of `allele_ids` is the second allele of
    /// a multiallelic site.
    fn fetch_genotype_calls(
        &self,
        allele_ids: &[AlleleId],
        sample_ids: &[SampleId],
    ) -> Result<Vec<GenotypeCall>, SegregationError>;

    /// The annotation transcripts of `allele_ids`.
    fn fetch_annotation_transcripts(
        &self,
        allele_ids: &[AlleleId],
    ) -> Result<Vec<AnnotationTranscript>, SegregationError>;
}

/// In-memory snapshot of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotStore {
    pub samples: Vec<Sample>,
    pub alleles: Vec<Allele>,
    pub genotypes: Vec<GenotypeCall>,
    pub annotation_transcripts: Vec<AnnotationTranscript>,
}

impl SnapshotStore {
    /// Load a snapshot from a JSON file, `.gz` files are decompressed.
    pub fn from_path<P>(path: P) -> Result<Self, SegregationError>
    where
        P: AsRef<Path>,
    {
        let store: Self =
            read_json(path.as_ref()).map_err(|e| SegregationError::Store(e.to_string()))?;
        tracing::debug!(
            "loaded snapshot with {} samples, {} alleles, {} genotype calls and {} transcripts",
            store.samples.len(),
            store.alleles.len(),
            store.genotypes.len(),
            store.annotation_transcripts.len()
        );
        Ok(store)
    }
}

impl SegregationStore for SnapshotStore {
    fn fetch_samples(&self, analysis_id: AnalysisId) -> Result<Vec<Sample>, SegregationError> {
        Ok(self
            .samples
            .iter()
            .filter(|sample| sample.analysis_id == analysis_id)
            .cloned()
            .collect())
    }

    fn fetch_alleles(&self, allele_ids: &[AlleleId]) -> Result<Vec<Allele>, SegregationError> {
        let allele_ids = allele_ids.iter().collect::<HashSet<_>>();
        Ok(self
            .alleles
            .iter()
            .filter(|allele| allele_ids.contains(&allele.id))
            .cloned()
            .collect())
    }

    fn fetch_genotype_calls(
        &self,
        allele_ids: &[AlleleId],
        sample_ids: &[SampleId],
    ) -> Result<Vec<GenotypeCall>, SegregationError> {
        let allele_ids = allele_ids.iter().collect::<HashSet<_>>();
        let sample_ids = sample_ids.iter().collect::<HashSet<_>>();
        Ok(self
            .genotypes
            .iter()
            .filter(|call| sample_ids.contains(&call.sample_id))
            .filter(|call| {
                call.called_allele_id()
                    .map(|allele_id| allele_ids.contains(&allele_id))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn fetch_annotation_transcripts(
        &self,
        allele_ids: &[AlleleId],
    ) -> Result<Vec<AnnotationTranscript>, SegregationError> {
        let allele_ids = allele_ids.iter().collect::<HashSet<_>>();
        Ok(self
            .annotation_transcripts
            .iter()
            .filter(|transcript| allele_ids.contains(&transcript.allele_id))
            .cloned()
            .collect())
    }
}
