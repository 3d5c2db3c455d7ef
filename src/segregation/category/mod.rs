//! Classification of alleles into inheritance categories.
//!
//! Each category is computed independently from the genotype table and the
//! pedigree and yields the set of matching allele ids.  Categories that need family
//! members that are not part of the analysis yield the empty set.

use std::collections::BTreeSet;

use crate::{
    err::SegregationError,
    segregation::{
        conf::GqThreshold,
        genes::GeneSymbols,
        genotype_table::{GenotypeRow, GenotypeTable},
        pedigree::Pedigree,
        schema::{AlleleId, Category, GenotypeType},
    },
};

mod compound_het;
mod denovo;
mod mosaicism;
mod no_coverage;
mod recessive;
mod siblings;

pub use compound_het::compound_heterozygous;
pub use denovo::denovo;
pub use mosaicism::parental_mosaicism;
pub use no_coverage::no_coverage_parents;
pub use recessive::{autosomal_recessive_homozygous, xlinked_recessive_homozygous};
pub use siblings::homozygous_unaffected_siblings;

/// Set of allele ids.
pub type AlleleIds = BTreeSet<AlleleId>;

/// Input shared by all category predicates.
#[derive(Debug, Clone, Copy)]
pub struct CategoryContext<'a> {
    pub table: &'a GenotypeTable,
    pub pedigree: &'a Pedigree,
    /// Gene symbols of the candidates, only used for compound heterozygous.
    pub gene_symbols: &'a GeneSymbols,
    /// Genotype quality thresholds, only used for de novo.
    pub gq_threshold: Option<GqThreshold>,
}

/// Compute the alleles in `category`.
pub fn compute(
    category: Category,
    ctx: &CategoryContext,
) -> Result<AlleleIds, SegregationError> {
    let result = match category {
        Category::Denovo => denovo(ctx.table, ctx.pedigree, ctx.gq_threshold.as_ref())?,
        Category::ParentalMosaicism => parental_mosaicism(ctx.table, ctx.pedigree)?,
        Category::AutosomalRecessiveHomozygous => {
            autosomal_recessive_homozygous(ctx.table, ctx.pedigree)
        }
        Category::XlinkedRecessiveHomozygous => {
            xlinked_recessive_homozygous(ctx.table, ctx.pedigree)
        }
        Category::CompoundHeterozygous => {
            compound_heterozygous(ctx.table, ctx.pedigree, ctx.gene_symbols)
        }
        Category::HomozygousUnaffectedSiblings => {
            homozygous_unaffected_siblings(ctx.table, ctx.pedigree)
        }
        Category::NoCoverageParents => no_coverage_parents(ctx.table, ctx.pedigree),
    };
    tracing::debug!("category {}: {} alleles", category, result.len());
    Ok(result)
}

/// Affected siblings all homozygous, unaffected siblings none homozygous.
///
/// Missing calls of unaffected siblings count as reference.
fn siblings_segregate_recessive(row: &GenotypeRow, pedigree: &Pedigree) -> bool {
    pedigree
        .affected_siblings
        .iter()
        .all(|sibling| row.is(sibling.id, GenotypeType::Homozygous))
        && pedigree.unaffected_siblings.iter().all(|sibling| {
            row.genotype_type_or_ref(sibling.id) != GenotypeType::Homozygous
        })
}
