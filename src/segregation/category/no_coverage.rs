//! Alleles without coverage in the parents.

use crate::segregation::{
    genotype_table::GenotypeTable, pedigree::Pedigree, schema::GenotypeType,
};

use super::AlleleIds;

/// Alleles where the father or the mother has no coverage.
///
/// Requires both parents.
pub fn no_coverage_parents(table: &GenotypeTable, pedigree: &Pedigree) -> AlleleIds {
    let Some((father, mother)) = pedigree.parents() else {
        return AlleleIds::new();
    };
    table
        .rows()
        .filter(|row| {
            row.is(father.id, GenotypeType::NoCoverage)
                || row.is(mother.id, GenotypeType::NoCoverage)
        })
        .map(|row| row.allele_id)
        .collect()
}
