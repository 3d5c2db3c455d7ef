//! Compound heterozygous candidates following the rules by Kamphans et al.

use std::collections::BTreeMap;

use crate::segregation::{
    genes::{alleles_by_symbol, GeneSymbols},
    genotype_table::{GenotypeRow, GenotypeTable},
    pedigree::Pedigree,
    schema::GenotypeType,
};

use super::AlleleIds;

/// Origin of a candidate allele that passed the per-allele rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transmission {
    Paternal,
    Maternal,
    /// Parents not both available, the origin is unknown.
    Unknown,
}

/// Apply the per-allele rules 1 to 3 to `row`.
///
/// 1. heterozygous in all affected individuals
/// 2. not homozygous in any unaffected individual
/// 3. heterozygous in exactly one parent (only checked when both are present)
fn transmission(row: &GenotypeRow, pedigree: &Pedigree) -> Option<Transmission> {
    let mut affected =
        std::iter::once(&pedigree.proband).chain(pedigree.affected_siblings.iter());
    if !affected.all(|sample| row.is(sample.id, GenotypeType::Heterozygous)) {
        return None;
    }

    let mut unaffected = pedigree
        .father
        .iter()
        .chain(pedigree.mother.iter())
        .chain(pedigree.unaffected_siblings.iter());
    if unaffected.any(|sample| row.is(sample.id, GenotypeType::Homozygous)) {
        return None;
    }

    let Some((father, mother)) = pedigree.parents() else {
        return Some(Transmission::Unknown);
    };
    match (
        row.genotype_type_or_ref(father.id),
        row.genotype_type_or_ref(mother.id),
    ) {
        (GenotypeType::Heterozygous, GenotypeType::Reference) => Some(Transmission::Paternal),
        (GenotypeType::Reference, GenotypeType::Heterozygous) => Some(Transmission::Maternal),
        _ => None,
    }
}

/// Alleles that are compound heterozygous candidates within at least one gene.
///
/// Per gene, at least two candidates must remain (rule 4).  With both parents
/// present, one of them must be inherited from the father and one from the mother
/// (rule 5).  Alleles without gene symbols are never candidates.
pub fn compound_heterozygous(
    table: &GenotypeTable,
    pedigree: &Pedigree,
    gene_symbols: &GeneSymbols,
) -> AlleleIds {
    let candidates = table
        .rows()
        .filter_map(|row| transmission(row, pedigree).map(|t| (row.allele_id, t)))
        .collect::<BTreeMap<_, _>>();

    let mut result = AlleleIds::new();
    for (symbol, allele_ids) in alleles_by_symbol(gene_symbols) {
        let in_gene = allele_ids
            .iter()
            .filter_map(|allele_id| candidates.get(allele_id).map(|t| (*allele_id, *t)))
            .collect::<Vec<_>>();
        if in_gene.len() < 2 {
            continue;
        }
        if pedigree.has_parents() {
            let paternal = in_gene
                .iter()
                .any(|(_, t)| *t == Transmission::Paternal);
            let maternal = in_gene
                .iter()
                .any(|(_, t)| *t == Transmission::Maternal);
            if !(paternal && maternal) {
                tracing::trace!("gene {} lacks transmission from both parents", symbol);
                continue;
            }
        }
        result.extend(in_gene.into_iter().map(|(allele_id, _)| allele_id));
    }
    result
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::segregation::{
        category::test::{build, Site},
        pedigree::test::{sample, trio},
        schema::{
            AlleleId, Sample,
            GenotypeType::{
                Heterozygous as Het, Homozygous as Hom, NoCoverage as NoCov, Reference as Ref,
            },
            Sex,
        },
    };

    fn symbols(entries: &[(AlleleId, &[&str])]) -> GeneSymbols {
        entries
            .iter()
            .map(|(allele_id, symbols)| {
                (
                    *allele_id,
                    symbols.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
                )
            })
            .collect()
    }

    #[test]
    fn paternal_and_maternal_in_gene() {
        let (pedigree, table) = build(
            &trio(Sex::Female),
            &[
                Site::new(1, "1", &[Het, Het, Ref]),
                Site::new(2, "1", &[Het, Ref, Het]),
                Site::new(3, "2", &[Het, Het, Ref]),
            ],
        );
        let symbols = symbols(&[(1, &["G"]), (2, &["G"]), (3, &["H"])]);

        assert_eq!(
            compound_heterozygous(&table, &pedigree, &symbols),
            AlleleIds::from([1, 2])
        );
    }

    #[test]
    fn same_parent_only() {
        let (pedigree, table) = build(
            &trio(Sex::Female),
            &[
                Site::new(1, "1", &[Het, Het, Ref]),
                Site::new(2, "1", &[Het, Het, Ref]),
            ],
        );
        let symbols = symbols(&[(1, &["H"]), (2, &["H"])]);

        assert!(compound_heterozygous(&table, &pedigree, &symbols).is_empty());
    }

    #[test]
    fn excludes_alleles_failing_parent_rule() {
        let (pedigree, table) = build(
            &trio(Sex::Male),
            &[
                Site::new(1, "1", &[Het, Het, Ref]),
                Site::new(2, "1", &[Het, Ref, Het]),
                Site::new(3, "1", &[Het, Het, Het]),
                Site::new(4, "1", &[Het, NoCov, Het]),
                Site::new(5, "1", &[Het, Hom, Ref]),
                Site::new(6, "1", &[Hom, Het, Ref]),
            ],
        );
        let symbols = symbols(&[
            (1, &["G"]),
            (2, &["G"]),
            (3, &["G"]),
            (4, &["G"]),
            (5, &["G"]),
            (6, &["G"]),
        ]);

        assert_eq!(
            compound_heterozygous(&table, &pedigree, &symbols),
            AlleleIds::from([1, 2])
        );
    }

    #[test]
    fn multiple_genes_per_allele() {
        let (pedigree, table) = build(
            &trio(Sex::Female),
            &[
                Site::new(1, "1", &[Het, Het, Ref]),
                Site::new(2, "1", &[Het, Ref, Het]),
                Site::new(3, "1", &[Het, Ref, Het]),
            ],
        );
        let symbols = symbols(&[(1, &["G", "G-AS"]), (2, &["G"]), (3, &["G-AS", "K"])]);

        assert_eq!(
            compound_heterozygous(&table, &pedigree, &symbols),
            AlleleIds::from([1, 2, 3])
        );
    }

    #[test]
    fn without_gene_symbols() {
        let (pedigree, table) = build(
            &trio(Sex::Female),
            &[
                Site::new(1, "1", &[Het, Het, Ref]),
                Site::new(2, "1", &[Het, Ref, Het]),
            ],
        );

        assert!(compound_heterozygous(&table, &pedigree, &GeneSymbols::new()).is_empty());
    }

    #[test]
    fn siblings() {
        let mut samples = trio(Sex::Female);
        samples.push(Sample {
            affected: true,
            sibling_id: Some(1),
            ..sample(4, "affected", Sex::Male)
        });
        samples.push(Sample {
            sibling_id: Some(1),
            ..sample(5, "unaffected", Sex::Female)
        });
        let (pedigree, table) = build(
            &samples,
            &[
                Site::new(1, "1", &[Het, Het, Ref, Het, Het]),
                Site::new(2, "1", &[Het, Ref, Het, Het, Ref]),
                Site::new(3, "1", &[Het, Het, Ref, Ref, Ref]),
                Site::new(4, "1", &[Het, Ref, Het, Het, Hom]),
            ],
        );
        let symbols = symbols(&[(1, &["G"]), (2, &["G"]), (3, &["G"]), (4, &["G"])]);

        assert_eq!(
            compound_heterozygous(&table, &pedigree, &symbols),
            AlleleIds::from([1, 2])
        );
    }

    #[test]
    fn single_parent() {
        let mut samples = trio(Sex::Female);
        samples.remove(2);
        let (pedigree, table) = build(
            &samples,
            &[
                Site::new(1, "1", &[Het, Het]),
                Site::new(2, "1", &[Het, Het]),
                Site::new(3, "1", &[Het, Hom]),
            ],
        );
        let symbols = symbols(&[(1, &["G"]), (2, &["G"]), (3, &["G"])]);

        assert_eq!(
            compound_heterozygous(&table, &pedigree, &symbols),
            AlleleIds::from([1, 2])
        );
    }

    #[test]
    fn proband_only() {
        let samples = vec![Sample {
            proband: true,
            affected: true,
            ..sample(1, "index", Sex::Male)
        }];
        let (pedigree, table) = build(
            &samples,
            &[
                Site::new(1, "1", &[Het]),
                Site::new(2, "1", &[Het]),
                Site::new(3, "1", &[Het]),
            ],
        );
        let symbols = symbols(&[(1, &["G"]), (2, &["G"]), (3, &["H"])]);

        assert_eq!(
            compound_heterozygous(&table, &pedigree, &symbols),
            AlleleIds::from([1, 2])
        );
    }
}
