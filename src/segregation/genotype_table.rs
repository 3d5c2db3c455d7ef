//! Assembly of the per-allele genotype table used by all category predicates.
//!
//! The table has one row per allele id.  Each row holds, for every sample of the
//! family, the called genotype type, the sample's sex and the requested extras.

use std::collections::HashSet;

use enum_map::EnumMap;
use indexmap::{IndexMap, IndexSet};

use crate::{
    err::SegregationError,
    segregation::{
        par,
        schema::{Allele, AlleleId, Extra, GenotypeCall, GenotypeType, Sample, SampleId, Sex},
    },
};

/// Flags for the materialised extras.
pub type Extras = EnumMap<Extra, bool>;

/// Build `Extras` from a list of extras.
pub fn extras_of(extras: &[Extra]) -> Extras {
    let mut result = Extras::default();
    for extra in extras {
        result[*extra] = true;
    }
    result
}

/// Facts of one sample at one allele.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleCall {
    /// Called type, `None` if the sample has no call for the allele.
    pub genotype_type: Option<GenotypeType>,
    /// Sex of the sample, constant across rows.
    pub sex: Sex,
    pub allele_ratio: Option<f64>,
    pub genotype_likelihoods: Option<Vec<u32>>,
    pub genotype_quality: Option<u32>,
}

/// One row of the genotype table.
#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeRow {
    pub allele_id: AlleleId,
    /// Whether the allele is on chromosome X outside of the PARs.
    pub x_outside_par: bool,
    extras: Extras,
    calls: IndexMap<SampleId, SampleCall>,
}

impl GenotypeRow {
    /// Construct an empty row for the given samples.
    fn new(allele_id: AlleleId, x_outside_par: bool, extras: Extras, samples: &[Sample]) -> Self {
        Self {
            allele_id,
            x_outside_par,
            extras,
            calls: samples
                .iter()
                .map(|sample| {
                    (
                        sample.id,
                        SampleCall {
                            sex: sample.sex,
                            ..Default::default()
                        },
                    )
                })
                .collect(),
        }
    }

    /// The called type of `sample`; `None` for missing calls and unknown samples.
    pub fn genotype_type(&self, sample: SampleId) -> Option<GenotypeType> {
        self.calls
            .get(&sample)
            .and_then(|call| call.genotype_type)
    }

    /// Whether `sample` has the called type `genotype_type`.
    pub fn is(&self, sample: SampleId, genotype_type: GenotypeType) -> bool {
        self.genotype_type(sample) == Some(genotype_type)
    }

    /// The called type, with missing calls treated as reference.
    pub fn genotype_type_or_ref(&self, sample: SampleId) -> GenotypeType {
        self.genotype_type(sample)
            .unwrap_or(GenotypeType::Reference)
    }

    /// The sex of `sample`.
    pub fn sex(&self, sample: SampleId) -> Sex {
        self.calls
            .get(&sample)
            .map(|call| call.sex)
            .unwrap_or_default()
    }

    fn require(&self, extra: Extra) -> Result<(), SegregationError> {
        if self.extras[extra] {
            Ok(())
        } else {
            Err(SegregationError::MissingRequiredExtra(extra))
        }
    }

    /// Allele ratio of `sample`.
    pub fn allele_ratio(&self, sample: SampleId) -> Result<Option<f64>, SegregationError> {
        self.require(Extra::AlleleRatio)?;
        Ok(self.calls.get(&sample).and_then(|call| call.allele_ratio))
    }

    /// Phred-scaled genotype likelihoods of `sample`.
    pub fn genotype_likelihoods(
        &self,
        sample: SampleId,
    ) -> Result<Option<&[u32]>, SegregationError> {
        self.require(Extra::GenotypeLikelihoods)?;
        Ok(self
            .calls
            .get(&sample)
            .and_then(|call| call.genotype_likelihoods.as_deref()))
    }

    /// Genotype quality of `sample`.
    pub fn genotype_quality(&self, sample: SampleId) -> Result<Option<u32>, SegregationError> {
        self.require(Extra::GenotypeQuality)?;
        Ok(self.calls.get(&sample).and_then(|call| call.genotype_quality))
    }

    /// Store the facts of `call` for its sample, keeping only requested extras.
    fn fill(&mut self, call: &GenotypeCall) {
        let extras = self.extras;
        if let Some(entry) = self.calls.get_mut(&call.sample_id) {
            entry.genotype_type = call.genotype_type;
            if extras[Extra::AlleleRatio] {
                entry.allele_ratio = call.allele_ratio;
            }
            if extras[Extra::GenotypeLikelihoods] {
                entry.genotype_likelihoods = call.genotype_likelihood.clone();
            }
            if extras[Extra::GenotypeQuality] {
                entry.genotype_quality = call.genotype_quality;
            }
        }
    }
}

/// The genotype table of one analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenotypeTable {
    extras: Extras,
    rows: IndexMap<AlleleId, GenotypeRow>,
}

impl GenotypeTable {
    /// Build the table for `allele_ids` and `samples`.
    ///
    /// # Arguments
    ///
    /// * `allele_ids` - The candidate alleles, duplicates are ignored.
    /// * `alleles` - Allele records, must cover all of `allele_ids`.
    /// * `samples` - The family members to add columns for.
    /// * `calls` - Genotype calls, including the calls on second alleles.
    /// * `extras` - The extras to materialise.
    ///
    /// # Errors
    ///
    /// * `SegregationError::UnsupportedReference` if an allele is not on GRCh37.
    /// * `SegregationError::InconsistentGenotypeTable` if an allele record is missing
    ///   or a sample has more than one call for an allele.
    pub fn build(
        allele_ids: &[AlleleId],
        alleles: &[Allele],
        samples: &[Sample],
        calls: &[GenotypeCall],
        extras: &[Extra],
    ) -> Result<Self, SegregationError> {
        let extras = extras_of(extras);
        let allele_ids = allele_ids.iter().copied().collect::<IndexSet<_>>();
        let alleles = alleles
            .iter()
            .filter(|allele| allele_ids.contains(&allele.id))
            .collect::<Vec<_>>();
        let x_outside_par = par::x_outside_par_ids(alleles.iter().copied())?;

        let known = alleles
            .iter()
            .map(|allele| allele.id)
            .collect::<HashSet<_>>();
        if let Some(missing) = allele_ids.iter().find(|id| !known.contains(id)) {
            return Err(SegregationError::InconsistentGenotypeTable(format!(
                "no allele record for allele {}",
                missing
            )));
        }

        let mut rows = allele_ids
            .iter()
            .map(|&allele_id| {
                (
                    allele_id,
                    GenotypeRow::new(
                        allele_id,
                        x_outside_par.contains(&allele_id),
                        extras,
                        samples,
                    ),
                )
            })
            .collect::<IndexMap<_, _>>();

        let sample_ids = samples
            .iter()
            .map(|sample| sample.id)
            .collect::<HashSet<_>>();
        let mut seen = HashSet::new();
        for call in calls {
            let Some(allele_id) = call.called_allele_id() else {
                continue;
            };
            if !sample_ids.contains(&call.sample_id) {
                continue;
            }
            let Some(row) = rows.get_mut(&allele_id) else {
                continue;
            };
            if !seen.insert((allele_id, call.sample_id)) {
                return Err(SegregationError::InconsistentGenotypeTable(format!(
                    "sample {} has more than one call for allele {}",
                    call.sample_id, allele_id
                )));
            }
            row.fill(call);
        }

        tracing::trace!(
            "built genotype table with {} rows, {} samples and {} calls",
            rows.len(),
            samples.len(),
            seen.len()
        );

        Ok(Self { extras, rows })
    }

    /// Whether `extra` was materialised.
    pub fn has_extra(&self, extra: Extra) -> bool {
        self.extras[extra]
    }

    /// Fail unless `extra` was materialised.
    pub fn require_extra(&self, extra: Extra) -> Result<(), SegregationError> {
        if self.has_extra(extra) {
            Ok(())
        } else {
            Err(SegregationError::MissingRequiredExtra(extra))
        }
    }

    /// Iterate over all rows in input order.
    pub fn rows(&self) -> impl Iterator<Item = &GenotypeRow> {
        self.rows.values()
    }

    /// The row for `allele_id`, if any.
    pub fn row(&self, allele_id: AlleleId) -> Option<&GenotypeRow> {
        self.rows.get(&allele_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
