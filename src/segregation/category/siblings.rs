//! Alleles homozygous in the proband and the unaffected siblings.

use crate::segregation::{
    genotype_table::GenotypeTable, pedigree::Pedigree, schema::GenotypeType,
};

use super::AlleleIds;

/// Alleles homozygous in the proband and in every unaffected sibling.
///
/// Empty if there are no unaffected siblings.
pub fn homozygous_unaffected_siblings(table: &GenotypeTable, pedigree: &Pedigree) -> AlleleIds {
    if pedigree.unaffected_siblings.is_empty() {
        return AlleleIds::new();
    }
    table
        .rows()
        .filter(|row| {
            row.is(pedigree.proband.id, GenotypeType::Homozygous)
                && pedigree
                    .unaffected_siblings
                    .iter()
                    .all(|sibling| row.is(sibling.id, GenotypeType::Homozygous))
        })
        .map(|row| row.allele_id)
        .collect()
}
