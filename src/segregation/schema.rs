//! Data structures consumed by the segregation filter.
//!
//! These mirror the records handed over by the storage collaborator.  All of them are
//! read-only snapshots for the duration of one filter call.

use serde::{Deserialize, Serialize};

/// Surrogate identifier of an allele.
pub type AlleleId = i64;
/// Surrogate identifier of a sample.
pub type SampleId = i64;
/// Surrogate identifier of an analysis.
pub type AnalysisId = i64;

/// Sex of a sample.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Sex {
    Male,
    Female,
    #[default]
    #[serde(alias = "unknown")]
    Unknown,
}

/// Called genotype of one sample at one allele.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum GenotypeType {
    #[serde(rename = "Reference")]
    #[strum(serialize = "Reference")]
    Reference,
    #[serde(rename = "Heterozygous")]
    #[strum(serialize = "Heterozygous")]
    Heterozygous,
    /// Homozygous alternative; hemizygous alternative for haploid calls.
    #[serde(rename = "Homozygous")]
    #[strum(serialize = "Homozygous")]
    Homozygous,
    #[serde(rename = "No coverage")]
    #[strum(serialize = "No coverage")]
    NoCoverage,
}

impl GenotypeType {
    /// Number of alternative alleles for a call of the given ploidy.
    ///
    /// Returns `None` for "No coverage".
    pub fn dosage(self, ploidy: u8) -> Option<u8> {
        match self {
            GenotypeType::Reference => Some(0),
            GenotypeType::Heterozygous => Some(1),
            GenotypeType::Homozygous => Some(ploidy),
            GenotypeType::NoCoverage => None,
        }
    }
}

/// Optional per-call fields that can be materialised into the genotype table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    enum_map::Enum,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Extra {
    /// Fraction of reads supporting the alternative allele.
    AlleleRatio,
    /// Phred-scaled genotype likelihoods.
    GenotypeLikelihoods,
    /// Genotype quality.
    GenotypeQuality,
}

/// The inheritance categories computed by the segregation filter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    enum_map::Enum,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Denovo,
    ParentalMosaicism,
    AutosomalRecessiveHomozygous,
    XlinkedRecessiveHomozygous,
    CompoundHeterozygous,
    HomozygousUnaffectedSiblings,
    NoCoverageParents,
}

impl Category {
    /// Whether the category retains alleles (all but the sibling category remove them).
    pub fn is_retaining(self) -> bool {
        !matches!(self, Category::HomozygousUnaffectedSiblings)
    }
}

/// A variant allele.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Allele {
    pub id: AlleleId,
    pub chromosome: String,
    /// 0-based start position, inclusive.
    pub start_position: i64,
    /// 0-based end position, exclusive.
    pub open_end_position: i64,
    pub genome_reference: String,
}

/// A sample of an analysis, with its family links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sample {
    pub id: SampleId,
    pub identifier: String,
    pub analysis_id: AnalysisId,
    pub sex: Sex,
    pub proband: bool,
    pub affected: bool,
    pub family_id: Option<String>,
    pub father_id: Option<SampleId>,
    pub mother_id: Option<SampleId>,
    /// Set on siblings, points to the proband.
    pub sibling_id: Option<SampleId>,
}

/// One genotype call of a sample at a (possibly multiallelic) site.
///
/// A site with two alternative alleles is stored once with `allele_id` and
/// `secondallele_id`; `secondallele` selects which of the two alleles the call
/// describes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenotypeCall {
    pub allele_id: AlleleId,
    pub secondallele_id: Option<AlleleId>,
    pub sample_id: SampleId,
    pub secondallele: bool,
    #[serde(rename = "type")]
    pub genotype_type: Option<GenotypeType>,
    pub allele_ratio: Option<f64>,
    pub genotype_likelihood: Option<Vec<u32>>,
    pub genotype_quality: Option<u32>,
}

impl GenotypeCall {
    /// The allele that this call describes.
    pub fn called_allele_id(&self) -> Option<AlleleId> {
        if self.secondallele {
            self.secondallele_id
        } else {
            Some(self.allele_id)
        }
    }
}

/// Transcript annotation of an allele, used for the gene symbol lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct AnnotationTranscript {
    pub allele_id: AlleleId,
    pub transcript_name: String,
    pub symbol: String,
}
