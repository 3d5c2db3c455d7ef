//! De novo classification from the called genotypes of the trio.

use crate::{
    err::SegregationError,
    segregation::{
        conf::GqThreshold,
        genotype_table::{GenotypeRow, GenotypeTable},
        pedigree::Pedigree,
        schema::{
            GenotypeType::{self, Heterozygous as Het, Homozygous as Hom, Reference as Ref},
            SampleId,
        },
    },
};

use super::AlleleIds;

/// Genotype triples `(proband, father, mother)` considered de novo on the autosomes
/// and within the PARs.
const AUTOSOMAL: &[(GenotypeType, GenotypeType, GenotypeType)] = &[
    (Het, Ref, Ref),
    (Hom, Ref, Ref),
    (Hom, Ref, Het),
    (Hom, Het, Ref),
];

/// De novo triples on X outside of PAR for male probands (hemizygous as homozygous).
const X_MALE: &[(GenotypeType, GenotypeType, GenotypeType)] = &[(Hom, Ref, Ref)];

/// De novo triples on X outside of PAR for female probands.
const X_FEMALE: &[(GenotypeType, GenotypeType, GenotypeType)] =
    &[(Het, Ref, Ref), (Hom, Ref, Ref), (Hom, Ref, Het)];

/// Whether all trio members reach the genotype quality thresholds.
///
/// Missing genotype qualities fail the thresholds.
fn passes_gq(
    row: &GenotypeRow,
    threshold: &GqThreshold,
    trio: (SampleId, SampleId, SampleId),
) -> Result<bool, SegregationError> {
    let (proband, father, mother) = trio;
    let passes = |sample: SampleId, min_gq: u32| -> Result<bool, SegregationError> {
        Ok(row
            .genotype_quality(sample)?
            .map(|gq| gq >= min_gq)
            .unwrap_or(false))
    };
    Ok(passes(proband, threshold.proband)?
        && passes(father, threshold.father)?
        && passes(mother, threshold.mother)?)
}

/// Alleles whose trio genotypes indicate a de novo event.
///
/// Requires both parents.  With `gq_threshold` set, the genotype quality extra must
/// have been materialised.
pub fn denovo(
    table: &GenotypeTable,
    pedigree: &Pedigree,
    gq_threshold: Option<&GqThreshold>,
) -> Result<AlleleIds, SegregationError> {
    let Some((father, mother)) = pedigree.parents() else {
        return Ok(AlleleIds::new());
    };
    let trio = (pedigree.proband.id, father.id, mother.id);
    let proband_is_male = pedigree.proband_is_male();

    let mut result = AlleleIds::new();
    for row in table.rows() {
        let triples = match (row.x_outside_par, proband_is_male) {
            (false, _) => AUTOSOMAL,
            (true, true) => X_MALE,
            (true, false) => X_FEMALE,
        };
        let observed = (
            row.genotype_type(trio.0),
            row.genotype_type(trio.1),
            row.genotype_type(trio.2),
        );
        let is_denovo = triples
            .iter()
            .any(|&(p, f, m)| observed == (Some(p), Some(f), Some(m)));
        if !is_denovo {
            continue;
        }
        if let Some(threshold) = gq_threshold {
            if !passes_gq(row, threshold, trio)? {
                tracing::trace!("allele {} fails de novo GQ thresholds", row.allele_id);
                continue;
            }
        }
        result.insert(row.allele_id);
    }
    Ok(result)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::segregation::{
        category::test::{build, Site},
        par::PAR1_START,
        pedigree::test::{sample, trio},
        schema::{Extra, GenotypeType::NoCoverage as NoCov, Sex},
    };

    #[rstest]
    #[case(Het, Ref, Ref, true)]
    #[case(Hom, Ref, Ref, true)]
    #[case(Hom, Ref, Het, true)]
    #[case(Hom, Het, Ref, true)]
    #[case(Het, Het, Ref, false)]
    #[case(Het, Ref, Het, false)]
    #[case(Hom, Het, Het, false)]
    #[case(Het, NoCov, Ref, false)]
    #[case(Het, Ref, NoCov, false)]
    #[case(Ref, Ref, Ref, false)]
    fn autosomal(
        #[case] proband: GenotypeType,
        #[case] father: GenotypeType,
        #[case] mother: GenotypeType,
        #[case] expected: bool,
    ) -> Result<(), anyhow::Error> {
        let (pedigree, table) = build(
            &trio(Sex::Male),
            &[Site::new(1, "1", &[proband, father, mother]).at(1)],
        );

        let res = denovo(&table, &pedigree, None)?;

        assert_eq!(res.contains(&1), expected);

        Ok(())
    }

    #[rstest]
    #[case(Sex::Male, Hom, Ref, Ref, true)]
    #[case(Sex::Male, Het, Ref, Ref, false)]
    #[case(Sex::Male, Hom, Ref, Het, false)]
    #[case(Sex::Female, Het, Ref, Ref, true)]
    #[case(Sex::Female, Hom, Ref, Ref, true)]
    #[case(Sex::Female, Hom, Ref, Het, true)]
    #[case(Sex::Female, Hom, Het, Ref, false)]
    fn x_outside_par(
        #[case] sex: Sex,
        #[case] proband: GenotypeType,
        #[case] father: GenotypeType,
        #[case] mother: GenotypeType,
        #[case] expected: bool,
    ) -> Result<(), anyhow::Error> {
        let (pedigree, table) = build(
            &trio(sex),
            &[Site::new(1, "X", &[proband, father, mother]).at(PAR1_START - 1)],
        );

        let res = denovo(&table, &pedigree, None)?;

        assert_eq!(res.contains(&1), expected);

        Ok(())
    }

    #[test]
    fn x_inside_par_uses_autosomal_rules() -> Result<(), anyhow::Error> {
        let (pedigree, table) = build(
            &trio(Sex::Male),
            &[Site::new(1, "X", &[Het, Ref, Ref]).at(PAR1_START)],
        );

        assert_eq!(denovo(&table, &pedigree, None)?, AlleleIds::from([1]));

        Ok(())
    }

    #[test]
    fn no_parents() -> Result<(), anyhow::Error> {
        let mut samples = trio(Sex::Male);
        samples.truncate(2);
        let (pedigree, table) = build(&samples, &[Site::new(1, "1", &[Het, Ref])]);

        assert!(denovo(&table, &pedigree, None)?.is_empty());

        Ok(())
    }

    #[rstest]
    #[case(&[30, 30, 30], true)]
    #[case(&[19, 30, 30], false)]
    #[case(&[30, 9, 30], false)]
    #[case(&[30, 30, 9], false)]
    #[case(&[20, 10, 10], true)]
    fn gq_threshold(#[case] quals: &[u32], #[case] expected: bool) -> Result<(), anyhow::Error> {
        let (pedigree, table) = build(
            &trio(Sex::Male),
            &[Site::new(1, "1", &[Het, Ref, Ref]).with_quals(quals)],
        );
        let threshold = GqThreshold {
            proband: 20,
            father: 10,
            mother: 10,
        };

        let res = denovo(&table, &pedigree, Some(&threshold))?;

        assert_eq!(res.contains(&1), expected);

        Ok(())
    }

    #[test]
    fn gq_threshold_missing_quality() -> Result<(), anyhow::Error> {
        let (pedigree, table) = build(&trio(Sex::Male), &[Site::new(1, "1", &[Het, Ref, Ref])]);

        let res = denovo(&table, &pedigree, Some(&GqThreshold::default()))?;

        assert!(res.is_empty());

        Ok(())
    }

    #[test]
    fn gq_threshold_requires_extra() {
        let samples = trio(Sex::Male);
        let (pedigree, _) = build(&samples, &[]);
        let alleles = vec![crate::segregation::schema::Allele::new(
            1,
            "1".into(),
            1,
            2,
            "GRCh37".into(),
        )];
        let calls = vec![
            crate::segregation::genotype_table::test::call(1, 1, Het),
            crate::segregation::genotype_table::test::call(1, 2, Ref),
            crate::segregation::genotype_table::test::call(1, 3, Ref),
        ];
        let table = GenotypeTable::build(&[1], &alleles, &samples, &calls, &[])
            .expect("valid table");

        assert_eq!(
            denovo(&table, &pedigree, Some(&GqThreshold::default())),
            Err(SegregationError::MissingRequiredExtra(Extra::GenotypeQuality))
        );
    }

    #[test]
    fn siblings_do_not_matter() -> Result<(), anyhow::Error> {
        let mut samples = trio(Sex::Female);
        samples.push(crate::segregation::schema::Sample {
            sibling_id: Some(1),
            ..sample(4, "sibling", Sex::Male)
        });
        let (pedigree, table) = build(&samples, &[Site::new(1, "1", &[Het, Ref, Ref, Het])]);

        assert_eq!(denovo(&table, &pedigree, None)?, AlleleIds::from([1]));

        Ok(())
    }
}
