//! Family-wide segregation filter combining the inheritance categories.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use enum_map::EnumMap;
use regex::Regex;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
    err::SegregationError,
    segregation::{
        category::{self, AlleleIds, CategoryContext},
        conf::{FilterConfig, Settings},
        denovo_probability::{denovo_p_value, DenovoProbability},
        genes::{gene_symbols, GeneSymbols},
        genotype_table::GenotypeTable,
        pedigree::Pedigree,
        schema::{AlleleId, AnalysisId, Category, Extra},
        storage::SegregationStore,
    },
};

/// Candidate alleles per analysis.
pub type AnalysisAlleleIds = BTreeMap<AnalysisId, Vec<AlleleId>>;

/// Category sets and de novo probabilities of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegregationResults {
    /// The alleles in each category.
    pub categories: EnumMap<Category, AlleleIds>,
    /// Posterior de novo probability of the alleles in the de novo category.
    pub denovo_p_values: BTreeMap<AlleleId, DenovoProbability>,
}

/// Result of `SegregationFilter::get_segregation_results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegregationOutput {
    pub results: BTreeMap<AnalysisId, SegregationResults>,
    /// Error messages of the analyses that could not be processed.
    pub failed: BTreeMap<AnalysisId, String>,
}

/// Result of `SegregationFilter::filter_alleles`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOutput {
    /// The alleles to remove per analysis.
    pub filtered_out: BTreeMap<AnalysisId, AlleleIds>,
    /// Error messages of the analyses that could not be processed.
    pub failed: BTreeMap<AnalysisId, String>,
}

/// Pedigree, genotype table and gene symbols of one analysis.
struct Prepared {
    pedigree: Pedigree,
    table: GenotypeTable,
    gene_symbols: GeneSymbols,
}

/// The segregation filter on top of a `SegregationStore`.
pub struct SegregationFilter<S: SegregationStore> {
    store: S,
    settings: Settings,
    inclusion_regex: Option<Regex>,
    cancel: Arc<AtomicBool>,
}

impl<S: SegregationStore> SegregationFilter<S> {
    /// Construct a new filter.
    ///
    /// # Errors
    ///
    /// `SegregationError::InvalidConfig` if the transcript regex does not compile or
    /// the de novo priors are not within `(0, 1)`.
    pub fn new(store: S, settings: Settings) -> Result<Self, SegregationError> {
        let inclusion_regex = settings
            .transcripts
            .inclusion_regex
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| {
                SegregationError::InvalidConfig(format!("invalid transcript regex: {}", e))
            })?;
        let priors = &settings.denovo_priors;
        for (name, value) in [
            ("mutation_rate", priors.mutation_rate),
            ("allele_frequency", priors.allele_frequency),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(SegregationError::InvalidConfig(format!(
                    "{} must be in (0, 1) but is {}",
                    name, value
                )));
            }
        }

        Ok(Self {
            store,
            settings,
            inclusion_regex,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Use `cancel` as the cancellation flag, checked between analyses.
    pub fn with_cancel(self, cancel: Arc<AtomicBool>) -> Self {
        Self { cancel, ..self }
    }

    /// The cancellation flag.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Compute all categories and the de novo probabilities for each analysis.
    ///
    /// Analyses without a family yield empty results.
    pub fn get_segregation_results(
        &self,
        analysis_allele_ids: &AnalysisAlleleIds,
    ) -> Result<SegregationOutput, SegregationError> {
        let extras = [Extra::AlleleRatio, Extra::GenotypeLikelihoods];
        let (results, failed) =
            self.for_each_analysis(analysis_allele_ids, |analysis_id, allele_ids| {
                let Some(prepared) = self.prepare(analysis_id, allele_ids, &extras, true)? else {
                    return Ok(SegregationResults::default());
                };
                let ctx = CategoryContext {
                    table: &prepared.table,
                    pedigree: &prepared.pedigree,
                    gene_symbols: &prepared.gene_symbols,
                    gq_threshold: None,
                };

                let mut categories = EnumMap::<Category, AlleleIds>::default();
                for category in Category::iter() {
                    categories[category] = category::compute(category, &ctx)?;
                }

                let denovo_p_values = match prepared.pedigree.parents() {
                    Some((father, mother)) => denovo_p_value(
                        &categories[Category::Denovo],
                        &prepared.table,
                        &prepared.pedigree.proband,
                        father,
                        mother,
                        &self.settings.denovo_priors,
                    )?,
                    None => BTreeMap::new(),
                };

                Ok(SegregationResults {
                    categories,
                    denovo_p_values,
                })
            })?;

        Ok(SegregationOutput { results, failed })
    }

    /// Compute the alleles to remove for each analysis.
    ///
    /// Alleles in any enabled category other than homozygous in unaffected siblings
    /// are retained; this positive filtering only happens when both parents are
    /// present.  Alleles homozygous in unaffected siblings are removed if that
    /// category is enabled.
    pub fn filter_alleles(
        &self,
        analysis_allele_ids: &AnalysisAlleleIds,
        filter_config: &FilterConfig,
    ) -> Result<FilterOutput, SegregationError> {
        let extras = filter_config.required_extras();
        let enabled = filter_config.enabled();
        let (filtered_out, failed) =
            self.for_each_analysis(analysis_allele_ids, |analysis_id, allele_ids| {
                let Some(prepared) = self.prepare(
                    analysis_id,
                    allele_ids,
                    &extras,
                    enabled[Category::CompoundHeterozygous],
                )?
                else {
                    return Ok(AlleleIds::new());
                };
                let ctx = CategoryContext {
                    table: &prepared.table,
                    pedigree: &prepared.pedigree,
                    gene_symbols: &prepared.gene_symbols,
                    gq_threshold: filter_config.denovo.gq_threshold,
                };

                let candidates = allele_ids.iter().copied().collect::<AlleleIds>();
                let mut retain = if prepared.pedigree.has_parents() {
                    let mut retain = AlleleIds::new();
                    for category in Category::iter().filter(|c| c.is_retaining() && enabled[*c])
                    {
                        retain.extend(category::compute(category, &ctx)?);
                    }
                    retain
                } else {
                    candidates.clone()
                };
                if enabled[Category::HomozygousUnaffectedSiblings] {
                    let siblings =
                        category::compute(Category::HomozygousUnaffectedSiblings, &ctx)?;
                    retain.retain(|allele_id| !siblings.contains(allele_id));
                }

                let filtered_out = candidates
                    .difference(&retain)
                    .copied()
                    .collect::<AlleleIds>();
                tracing::debug!(
                    "analysis {}: filtering out {} of {} alleles",
                    analysis_id,
                    filtered_out.len(),
                    candidates.len()
                );
                Ok(filtered_out)
            })?;

        Ok(FilterOutput {
            filtered_out,
            failed,
        })
    }

    /// Run `func` for each analysis, collecting results and per-analysis failures.
    ///
    /// Errors that abort the call and cancellation are returned directly.
    fn for_each_analysis<T, F>(
        &self,
        analysis_allele_ids: &AnalysisAlleleIds,
        func: F,
    ) -> Result<(BTreeMap<AnalysisId, T>, BTreeMap<AnalysisId, String>), SegregationError>
    where
        F: Fn(AnalysisId, &[AlleleId]) -> Result<T, SegregationError>,
    {
        let mut results = BTreeMap::new();
        let mut failed = BTreeMap::new();
        for (analysis_id, allele_ids) in analysis_allele_ids {
            if self.cancel.load(Ordering::Relaxed) {
                tracing::warn!("cancelled before analysis {}", analysis_id);
                return Err(SegregationError::Cancelled);
            }
            match func(*analysis_id, allele_ids) {
                Ok(result) => {
                    results.insert(*analysis_id, result);
                }
                Err(e) if e.aborts_call() => return Err(e),
                Err(e) => {
                    tracing::warn!("could not process analysis {}: {}", analysis_id, e);
                    failed.insert(*analysis_id, e.to_string());
                }
            }
        }
        Ok((results, failed))
    }

    /// Load pedigree, genotype table and, if `with_genes`, the gene symbols.
    ///
    /// Returns `None` if the analysis has no family or there are no candidates.
    fn prepare(
        &self,
        analysis_id: AnalysisId,
        allele_ids: &[AlleleId],
        extras: &[Extra],
        with_genes: bool,
    ) -> Result<Option<Prepared>, SegregationError> {
        if allele_ids.is_empty() {
            return Ok(None);
        }
        let samples = self.store.fetch_samples(analysis_id)?;
        let Some(pedigree) = Pedigree::resolve(&samples)? else {
            tracing::debug!("analysis {} has no family, skipping", analysis_id);
            return Ok(None);
        };

        let members = pedigree.members().cloned().collect::<Vec<_>>();
        let alleles = self.store.fetch_alleles(allele_ids)?;
        let calls = self
            .store
            .fetch_genotype_calls(allele_ids, &pedigree.sample_ids())?;
        let table = GenotypeTable::build(allele_ids, &alleles, &members, &calls, extras)?;

        let gene_symbols = if with_genes {
            let transcripts = self.store.fetch_annotation_transcripts(allele_ids)?;
            let candidates = allele_ids.iter().copied().collect::<BTreeSet<_>>();
            gene_symbols(&candidates, &transcripts, self.inclusion_regex.as_ref())
        } else {
            GeneSymbols::new()
        };

        Ok(Some(Prepared {
            pedigree,
            table,
            gene_symbols,
        }))
    }
}
