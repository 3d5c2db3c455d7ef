//! Posterior probability of de novo events from genotype likelihoods.
//!
//! The de novo hypothesis (parents carry the dosages of the de novo mode and the
//! proband carries a new allele) is weighed against all Mendelian explanations of the
//! trio's data.  Parental genotypes get a Hardy-Weinberg prior, the de novo event a
//! mutation rate prior.  All computation is done in log space.

use std::collections::{BTreeMap, BTreeSet};

use bio::stats::{LogProb, PHREDProb};

use crate::{
    err::SegregationError,
    segregation::{
        conf::DenovoPriors,
        genotype_table::GenotypeTable,
        schema::{AlleleId, Extra, GenotypeType, Sample, Sex},
    },
};

/// Result of the de novo probability computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DenovoProbability {
    /// Posterior probability in `[0, 1]`.
    Value(f64),
    /// No score available as genotype likelihoods are missing.
    Missing,
}

impl DenovoProbability {
    /// The probability, if available.
    pub fn value(&self) -> Option<f64> {
        match self {
            DenovoProbability::Value(value) => Some(*value),
            DenovoProbability::Missing => None,
        }
    }
}

impl std::fmt::Display for DenovoProbability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenovoProbability::Value(value) => write!(f, "{}", value),
            DenovoProbability::Missing => write!(f, "-"),
        }
    }
}

impl serde::Serialize for DenovoProbability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            DenovoProbability::Value(value) => serializer.serialize_f64(*value),
            DenovoProbability::Missing => serializer.serialize_str("-"),
        }
    }
}

/// Ploidy of the trio members at a locus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ploidies {
    father: u8,
    mother: u8,
    proband: u8,
}

impl Ploidies {
    fn new(x_outside_par: bool, proband_is_male: bool) -> Self {
        if x_outside_par {
            Self {
                father: 1,
                mother: 2,
                proband: if proband_is_male { 1 } else { 2 },
            }
        } else {
            Self {
                father: 2,
                mother: 2,
                proband: 2,
            }
        }
    }
}

/// Alternative allele dosages of father, mother and proband under the de novo hypothesis.
///
/// Dosages count alternative alleles, so a hemizygous alternative call on X has
/// dosage 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct DenovoMode {
    pub father: u8,
    pub mother: u8,
    pub proband: u8,
}

impl DenovoMode {
    /// Derive the mode from the called types of the trio.
    ///
    /// Returns `None` if any of the calls is missing or "No coverage".
    pub fn from_types(
        proband: Option<GenotypeType>,
        father: Option<GenotypeType>,
        mother: Option<GenotypeType>,
        x_outside_par: bool,
        proband_is_male: bool,
    ) -> Option<Self> {
        let ploidies = Ploidies::new(x_outside_par, proband_is_male);
        Some(Self {
            father: father?.dosage(ploidies.father)?,
            mother: mother?.dosage(ploidies.mother)?,
            proband: proband?.dosage(ploidies.proband)?,
        })
    }

    /// Check that the proband dosage is unique and all dosages fit the ploidies.
    fn validate(&self, ploidies: Ploidies) -> Result<(), SegregationError> {
        if self.proband == self.father
            || self.proband == self.mother
            || self.father > ploidies.father
            || self.mother > ploidies.mother
            || self.proband > ploidies.proband
        {
            Err(SegregationError::InvalidDenovoMode {
                father: self.father,
                mother: self.mother,
                proband: self.proband,
            })
        } else {
            Ok(())
        }
    }
}

/// Normalised genotype log-likelihoods from a Phred-scaled vector.
///
/// Haploid members use the first and last entry of a diploid vector.  Returns `None`
/// if the vector does not fit the ploidy.
fn genotype_likelihoods(pl: &[u32], ploidy: u8) -> Option<Vec<LogProb>> {
    let pl = match (ploidy, pl.len()) {
        (1, 2) | (2, 3) => pl.to_vec(),
        (1, 3) => vec![pl[0], pl[2]],
        _ => return None,
    };
    let raw = pl
        .iter()
        .map(|&value| LogProb::from(PHREDProb(value as f64)))
        .collect::<Vec<_>>();
    let total = LogProb::ln_sum_exp(&raw);
    Some(raw.into_iter().map(|value| value - total).collect())
}

/// Hardy-Weinberg prior over the genotypes of a parent.
fn genotype_prior(ploidy: u8, allele_frequency: f64) -> Vec<LogProb> {
    let alt = allele_frequency;
    let reference = 1.0 - allele_frequency;
    let probs = if ploidy == 1 {
        vec![reference, alt]
    } else {
        vec![reference * reference, 2.0 * reference * alt, alt * alt]
    };
    probs.into_iter().map(|p| LogProb(p.ln())).collect()
}

/// Probability that a parent with `dosage` of `ploidy` transmits the alternative allele.
fn transmission(dosage: usize, ploidy: u8) -> f64 {
    dosage as f64 / ploidy as f64
}

/// Distribution of the child's dosage given the parental dosages.
fn child_distribution(father: usize, mother: usize, ploidies: Ploidies) -> Vec<f64> {
    let from_mother = transmission(mother, ploidies.mother);
    if ploidies.proband == 1 {
        // hemizygous sons inherit the maternal X only
        vec![1.0 - from_mother, from_mother]
    } else {
        let from_father = transmission(father, ploidies.father);
        vec![
            (1.0 - from_father) * (1.0 - from_mother),
            from_father * (1.0 - from_mother) + (1.0 - from_father) * from_mother,
            from_father * from_mother,
        ]
    }
}

/// Compute the posterior probability of a de novo event.
///
/// # Arguments
///
/// * `pl_proband`, `pl_father`, `pl_mother` - Phred-scaled genotype likelihoods.
/// * `x_outside_par` - Whether the locus is on X outside of the PARs.
/// * `proband_is_male` - Whether the proband is male.
/// * `mode` - Dosages of the trio under the de novo hypothesis.
/// * `priors` - Mutation rate and allele frequency priors.
///
/// # Returns
///
/// `DenovoProbability::Missing` if any likelihood vector is missing, empty or does not
/// fit the ploidy of its sample.
///
/// # Errors
///
/// `SegregationError::InvalidDenovoMode` if the proband's dosage is shared with a
/// parent or a dosage exceeds the ploidy.
pub fn denovo_probability(
    pl_proband: Option<&[u32]>,
    pl_father: Option<&[u32]>,
    pl_mother: Option<&[u32]>,
    x_outside_par: bool,
    proband_is_male: bool,
    mode: DenovoMode,
    priors: &DenovoPriors,
) -> Result<DenovoProbability, SegregationError> {
    let ploidies = Ploidies::new(x_outside_par, proband_is_male);
    mode.validate(ploidies)?;

    let (Some(pl_proband), Some(pl_father), Some(pl_mother)) = (pl_proband, pl_father, pl_mother)
    else {
        return Ok(DenovoProbability::Missing);
    };
    let (Some(l_proband), Some(l_father), Some(l_mother)) = (
        genotype_likelihoods(pl_proband, ploidies.proband),
        genotype_likelihoods(pl_father, ploidies.father),
        genotype_likelihoods(pl_mother, ploidies.mother),
    ) else {
        tracing::trace!(
            "genotype likelihoods {:?} / {:?} / {:?} missing or not matching ploidies {:?}",
            pl_proband,
            pl_father,
            pl_mother,
            ploidies
        );
        return Ok(DenovoProbability::Missing);
    };

    let prior_father = genotype_prior(ploidies.father, priors.allele_frequency);
    let prior_mother = genotype_prior(ploidies.mother, priors.allele_frequency);

    let mut mendelian = Vec::new();
    for (gf, (prior_f, l_f)) in prior_father.iter().zip(l_father.iter()).enumerate() {
        for (gm, (prior_m, l_m)) in prior_mother.iter().zip(l_mother.iter()).enumerate() {
            for (gc, p_child) in child_distribution(gf, gm, ploidies).into_iter().enumerate() {
                if p_child > 0.0 {
                    mendelian.push(
                        *prior_f + *l_f + *prior_m + *l_m + LogProb(p_child.ln()) + l_proband[gc],
                    );
                }
            }
        }
    }
    let mendelian = LogProb::ln_sum_exp(&mendelian) + LogProb((1.0 - priors.mutation_rate).ln());

    let (f, m, c) = (
        mode.father as usize,
        mode.mother as usize,
        mode.proband as usize,
    );
    let denovo = LogProb(priors.mutation_rate.ln())
        + prior_father[f]
        + l_father[f]
        + prior_mother[m]
        + l_mother[m]
        + l_proband[c];

    let posterior = (denovo - denovo.ln_add_exp(mendelian)).0.exp();
    Ok(DenovoProbability::Value(posterior.clamp(0.0, 1.0)))
}

/// Compute the de novo probability for each of `allele_ids`.
///
/// The de novo mode of each allele is derived from the trio's called types.  Alleles
/// without a row in the table are skipped.
///
/// # Errors
///
/// * `SegregationError::MissingRequiredExtra` if the table lacks genotype likelihoods.
/// * `SegregationError::InvalidDenovoMode` if an allele's calls do not describe a de
///   novo configuration.
pub fn denovo_p_value(
    allele_ids: &BTreeSet<AlleleId>,
    table: &GenotypeTable,
    proband: &Sample,
    father: &Sample,
    mother: &Sample,
    priors: &DenovoPriors,
) -> Result<BTreeMap<AlleleId, DenovoProbability>, SegregationError> {
    table.require_extra(Extra::GenotypeLikelihoods)?;

    let mut result = BTreeMap::new();
    for allele_id in allele_ids {
        let Some(row) = table.row(*allele_id) else {
            continue;
        };
        let proband_is_male = row.sex(proband.id) == Sex::Male;
        let mode = DenovoMode::from_types(
            row.genotype_type(proband.id),
            row.genotype_type(father.id),
            row.genotype_type(mother.id),
            row.x_outside_par,
            proband_is_male,
        );
        let probability = match mode {
            Some(mode) => denovo_probability(
                row.genotype_likelihoods(proband.id)?,
                row.genotype_likelihoods(father.id)?,
                row.genotype_likelihoods(mother.id)?,
                row.x_outside_par,
                proband_is_male,
                mode,
                priors,
            )?,
            None => DenovoProbability::Missing,
        };
        tracing::trace!("de novo probability of allele {}: {}", allele_id, probability);
        result.insert(*allele_id, probability);
    }
    Ok(result)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn p(
        pl_proband: &[u32],
        pl_father: &[u32],
        pl_mother: &[u32],
        x_outside_par: bool,
        proband_is_male: bool,
        mode: DenovoMode,
    ) -> f64 {
        denovo_probability(
            Some(pl_proband),
            Some(pl_father),
            Some(pl_mother),
            x_outside_par,
            proband_is_male,
            mode,
            &DenovoPriors::default(),
        )
        .expect("valid mode")
        .value()
        .expect("value expected")
    }

    #[test]
    fn genotype_likelihoods_normalized() {
        let likelihoods = genotype_likelihoods(&[10, 0, 10], 2).expect("fits ploidy");
        let total: f64 = likelihoods.iter().map(|l| l.0.exp()).sum();

        assert!(float_cmp::approx_eq!(f64, total, 1.0, epsilon = 1e-12));
        assert!(float_cmp::approx_eq!(
            f64,
            likelihoods[0].0.exp(),
            0.1 / 1.2,
            epsilon = 1e-12
        ));
    }

    #[rstest]
    #[case(&[0, 30], 1, Some(2))]
    #[case(&[0, 30, 60], 1, Some(2))]
    #[case(&[0, 30, 60], 2, Some(3))]
    #[case(&[0, 30], 2, None)]
    #[case(&[], 2, None)]
    fn genotype_likelihoods_ploidy(
        #[case] pl: &[u32],
        #[case] ploidy: u8,
        #[case] expected_len: Option<usize>,
    ) {
        assert_eq!(
            genotype_likelihoods(pl, ploidy).map(|l| l.len()),
            expected_len
        );
    }

    #[test]
    fn clear_autosomal_het_denovo() {
        let posterior = p(
            &[99, 0, 255],
            &[0, 99, 255],
            &[0, 99, 255],
            false,
            false,
            DenovoMode::new(0, 0, 1),
        );

        assert!(posterior > 0.99, "posterior = {}", posterior);
        assert!(posterior <= 1.0);
    }

    #[test]
    fn proband_possibly_reference() {
        let posterior = p(
            &[20, 0, 255],
            &[0, 99, 255],
            &[0, 99, 255],
            false,
            false,
            DenovoMode::new(0, 0, 1),
        );

        assert!(posterior < 0.01, "posterior = {}", posterior);
    }

    #[test]
    fn parent_possibly_het() {
        let posterior = p(
            &[99, 0, 255],
            &[10, 0, 255],
            &[0, 99, 255],
            false,
            false,
            DenovoMode::new(0, 0, 1),
        );

        assert!(posterior < 0.01, "posterior = {}", posterior);
    }

    #[test]
    fn hom_proband_het_mother() {
        let posterior = p(
            &[255, 99, 0],
            &[0, 99, 255],
            &[99, 0, 99],
            false,
            false,
            DenovoMode::new(0, 1, 2),
        );

        assert!(posterior > 0.9, "posterior = {}", posterior);
    }

    #[test]
    fn parents_symmetric_on_autosomes() {
        let lhs = p(
            &[255, 99, 0],
            &[0, 99, 255],
            &[60, 0, 99],
            false,
            false,
            DenovoMode::new(0, 1, 2),
        );
        let rhs = p(
            &[255, 99, 0],
            &[60, 0, 99],
            &[0, 99, 255],
            false,
            false,
            DenovoMode::new(1, 0, 2),
        );

        assert!(float_cmp::approx_eq!(f64, lhs, rhs, epsilon = 1e-12));
    }

    #[rstest]
    #[case(&[99, 0])]
    #[case(&[99, 50, 0])]
    fn hemizygous_male_denovo(#[case] pl_proband: &[u32]) {
        let posterior = p(
            pl_proband,
            &[0, 99],
            &[0, 99, 255],
            true,
            true,
            DenovoMode::new(0, 0, 1),
        );

        assert!(posterior > 0.99, "posterior = {}", posterior);
    }

    #[test]
    fn hemizygous_male_mother_possibly_het() {
        let posterior = p(
            &[99, 0],
            &[0, 99],
            &[10, 0, 255],
            true,
            true,
            DenovoMode::new(0, 0, 1),
        );

        assert!(posterior < 0.01, "posterior = {}", posterior);
    }

    #[rstest]
    #[case(None, Some(&[0u32, 99, 255][..]), Some(&[0u32, 99, 255][..]))]
    #[case(Some(&[99u32, 0, 255][..]), None, Some(&[0u32, 99, 255][..]))]
    #[case(Some(&[99u32, 0, 255][..]), Some(&[0u32, 99, 255][..]), Some(&[][..]))]
    fn missing_likelihoods(
        #[case] pl_proband: Option<&[u32]>,
        #[case] pl_father: Option<&[u32]>,
        #[case] pl_mother: Option<&[u32]>,
    ) -> Result<(), anyhow::Error> {
        let res = denovo_probability(
            pl_proband,
            pl_father,
            pl_mother,
            false,
            false,
            DenovoMode::new(0, 0, 1),
            &DenovoPriors::default(),
        )?;

        assert_eq!(res, DenovoProbability::Missing);
        assert_eq!(res.to_string(), "-");
        assert_eq!(serde_json::to_string(&res)?, "\"-\"");

        Ok(())
    }

    #[rstest]
    #[case(DenovoMode::new(1, 0, 1), false, false)]
    #[case(DenovoMode::new(0, 2, 2), false, false)]
    #[case(DenovoMode::new(0, 0, 2), true, true)]
    #[case(DenovoMode::new(2, 0, 1), true, false)]
    fn invalid_mode(
        #[case] mode: DenovoMode,
        #[case] x_outside_par: bool,
        #[case] proband_is_male: bool,
    ) {
        let res = denovo_probability(
            Some(&[99, 0, 255]),
            Some(&[0, 99, 255]),
            Some(&[0, 99, 255]),
            x_outside_par,
            proband_is_male,
            mode,
            &DenovoPriors::default(),
        );

        assert!(matches!(
            res,
            Err(SegregationError::InvalidDenovoMode { .. })
        ));
    }

    #[rstest]
    #[case(GenotypeType::Heterozygous, GenotypeType::Reference, GenotypeType::Reference, false, false, Some(DenovoMode::new(0, 0, 1)))]
    #[case(GenotypeType::Homozygous, GenotypeType::Reference, GenotypeType::Heterozygous, false, false, Some(DenovoMode::new(0, 1, 2)))]
    #[case(GenotypeType::Homozygous, GenotypeType::Reference, GenotypeType::Reference, true, true, Some(DenovoMode::new(0, 0, 1)))]
    #[case(GenotypeType::Homozygous, GenotypeType::Reference, GenotypeType::Heterozygous, true, false, Some(DenovoMode::new(0, 1, 2)))]
    #[case(GenotypeType::Heterozygous, GenotypeType::NoCoverage, GenotypeType::Reference, false, false, None)]
    fn mode_from_types(
        #[case] proband: GenotypeType,
        #[case] father: GenotypeType,
        #[case] mother: GenotypeType,
        #[case] x_outside_par: bool,
        #[case] proband_is_male: bool,
        #[case] expected: Option<DenovoMode>,
    ) {
        assert_eq!(
            DenovoMode::from_types(
                Some(proband),
                Some(father),
                Some(mother),
                x_outside_par,
                proband_is_male
            ),
            expected
        );
    }

    #[test]
    fn value_serialization() -> Result<(), anyhow::Error> {
        assert_eq!(
            serde_json::to_string(&DenovoProbability::Value(0.5))?,
            "0.5"
        );
        assert_eq!(DenovoProbability::Value(0.5).value(), Some(0.5));

        Ok(())
    }
}
