//! Parental mosaicism from allele ratios.

use crate::{
    err::SegregationError,
    segregation::{
        genotype_table::GenotypeTable,
        pedigree::Pedigree,
        schema::{Extra, GenotypeType},
    },
};

use super::AlleleIds;

/// Upper bound (inclusive) of the allele ratio of a mosaic heterozygous parent.
pub const MOSAIC_HET_MAX: f64 = 0.3;
/// Upper bound (inclusive) of the allele ratio of a mosaic hemizygous parent.
pub const MOSAIC_HOM_MAX: f64 = 0.8;
/// Lower bound (exclusive) of the proband allele ratio for a non-mosaic call.
pub const NON_MOSAIC_MIN: f64 = 0.3;

/// Whether `allele_ratio` lies in `(0, max]`.
fn in_mosaic_range(allele_ratio: Option<f64>, max: f64) -> bool {
    matches!(allele_ratio, Some(ar) if ar > 0.0 && ar <= max)
}

/// Alleles where the proband has a non-mosaic call and a parent shows a low allele
/// ratio.
///
/// On X outside of PAR the father is hemizygous, so his allele ratio is checked
/// against the homozygous range.  Requires both parents.
pub fn parental_mosaicism(
    table: &GenotypeTable,
    pedigree: &Pedigree,
) -> Result<AlleleIds, SegregationError> {
    let Some((father, mother)) = pedigree.parents() else {
        return Ok(AlleleIds::new());
    };
    table.require_extra(Extra::AlleleRatio)?;
    let proband = &pedigree.proband;

    let mut result = AlleleIds::new();
    for row in table.rows() {
        if row.is(father.id, GenotypeType::NoCoverage)
            || row.is(mother.id, GenotypeType::NoCoverage)
        {
            continue;
        }

        let proband_type_ok = if row.x_outside_par {
            row.is(proband.id, GenotypeType::Heterozygous)
                || row.is(proband.id, GenotypeType::Homozygous)
        } else {
            row.is(proband.id, GenotypeType::Heterozygous)
        };
        let proband_non_mosaic =
            matches!(row.allele_ratio(proband.id)?, Some(ar) if ar > NON_MOSAIC_MIN);
        if !proband_type_ok || !proband_non_mosaic {
            continue;
        }

        let father_max = if row.x_outside_par {
            MOSAIC_HOM_MAX
        } else {
            MOSAIC_HET_MAX
        };
        if in_mosaic_range(row.allele_ratio(father.id)?, father_max)
            || in_mosaic_range(row.allele_ratio(mother.id)?, MOSAIC_HET_MAX)
        {
            result.insert(row.allele_id);
        }
    }
    Ok(result)
}
