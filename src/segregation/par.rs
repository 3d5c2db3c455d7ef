//! Pseudoautosomal regions of chromosome X.
//!
//! Alleles on chromosome X outside of PAR1/PAR2 are hemizygous in males and are
//! handled by the X-linked branches of the category predicates.

use std::collections::BTreeSet;

use crate::{
    common::{is_chrom_x, resolve_accession, GenomeRelease},
    err::SegregationError,
    segregation::schema::{Allele, AlleleId},
};

/// The genome release the PAR coordinates below refer to.
pub const SUPPORTED_RELEASE: GenomeRelease = GenomeRelease::Grch37;

/// First base of PAR1 (GRCh37).
pub const PAR1_START: i64 = 60_001;
/// Last base of PAR1 (GRCh37).
pub const PAR1_END: i64 = 2_699_520;
/// First base of PAR2 (GRCh37).
pub const PAR2_START: i64 = 154_931_044;
/// Last base of PAR2 (GRCh37).
pub const PAR2_END: i64 = 155_260_560;

/// Fail unless `allele` is on the supported genome release.
pub fn check_reference(allele: &Allele) -> Result<(), SegregationError> {
    match allele.genome_reference.parse::<GenomeRelease>() {
        Ok(release) if release == SUPPORTED_RELEASE => Ok(()),
        _ => Err(SegregationError::UnsupportedReference {
            allele_id: allele.id,
            reference: allele.genome_reference.clone(),
        }),
    }
}

/// Whether `allele` lies on chromosome X outside of the pseudoautosomal regions.
///
/// Coordinates are 0-based half-open, so an allele ending at `PAR1_START` does not
/// overlap PAR1.
pub fn is_x_outside_par(allele: &Allele) -> bool {
    is_chrom_x(&resolve_accession(SUPPORTED_RELEASE, &allele.chromosome))
        && (allele.open_end_position <= PAR1_START
            || (allele.start_position > PAR1_END && allele.open_end_position <= PAR2_START)
            || allele.start_position > PAR2_END)
}

/// Return the ids of the alleles on X outside of PAR.
///
/// # Errors
///
/// Returns `SegregationError::UnsupportedReference` for the first allele that is not
/// on the supported genome release.
pub fn x_outside_par_ids<'a, I>(alleles: I) -> Result<BTreeSet<AlleleId>, SegregationError>
where
    I: IntoIterator<Item = &'a Allele>,
{
    let mut result = BTreeSet::new();
    for allele in alleles {
        check_reference(allele)?;
        if is_x_outside_par(allele) {
            result.insert(allele.id);
        }
    }
    Ok(result)
}
