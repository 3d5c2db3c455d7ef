//! Homozygous recessive categories on the autosomes and on X.

use crate::segregation::{
    genotype_table::GenotypeTable, pedigree::Pedigree, schema::GenotypeType,
};

use super::{siblings_segregate_recessive, AlleleIds};

/// Alleles homozygous in the proband with both parents heterozygous.
///
/// Alleles on X outside of PAR are never autosomal recessive.
pub fn autosomal_recessive_homozygous(table: &GenotypeTable, pedigree: &Pedigree) -> AlleleIds {
    let Some((father, mother)) = pedigree.parents() else {
        return AlleleIds::new();
    };
    table
        .rows()
        .filter(|row| {
            !row.x_outside_par
                && row.is(pedigree.proband.id, GenotypeType::Homozygous)
                && row.is(father.id, GenotypeType::Heterozygous)
                && row.is(mother.id, GenotypeType::Heterozygous)
                && siblings_segregate_recessive(row, pedigree)
        })
        .map(|row| row.allele_id)
        .collect()
}

/// Alleles on X outside of PAR, homozygous in the proband, heterozygous in the
/// mother and reference in the father.
pub fn xlinked_recessive_homozygous(table: &GenotypeTable, pedigree: &Pedigree) -> AlleleIds {
    let Some((father, mother)) = pedigree.parents() else {
        return AlleleIds::new();
    };
    table
        .rows()
        .filter(|row| {
            row.x_outside_par
                && row.is(pedigree.proband.id, GenotypeType::Homozygous)
                && row.is(father.id, GenotypeType::Reference)
                && row.is(mother.id, GenotypeType::Heterozygous)
                && siblings_segregate_recessive(row, pedigree)
        })
        .map(|row| row.allele_id)
        .collect()
}
