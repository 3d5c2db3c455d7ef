//! Configuration of the segregation filter.

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::segregation::schema::{Category, Extra};

/// Settings for the transcripts used for the gene symbol lookup.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
#[serde(default)]
pub struct TranscriptsSettings {
    /// Regular expression selecting the transcripts to consider, all if unset.
    pub inclusion_regex: Option<String>,
}

/// Priors of the de novo probability model.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
#[serde(default)]
pub struct DenovoPriors {
    /// Prior probability of a de novo mutation at a site.
    pub mutation_rate: f64,
    /// Alternative allele frequency for the parental genotype prior.
    pub allele_frequency: f64,
}

impl Default for DenovoPriors {
    fn default() -> Self {
        Self {
            mutation_rate: 1.0 / 30_000_000.0,
            allele_frequency: 1e-3,
        }
    }
}

/// Global settings of the segregation filter.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub transcripts: TranscriptsSettings,
    pub denovo_priors: DenovoPriors,
}

/// Minimal genotype quality per trio member.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(default)]
pub struct GqThreshold {
    pub proband: u32,
    pub father: u32,
    pub mother: u32,
}

/// Configuration of a single category.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(default)]
pub struct CategoryConfig {
    pub enable: bool,
}

/// Configuration of the de novo category.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(default)]
pub struct DenovoConfig {
    pub enable: bool,
    /// Optional genotype quality thresholds for the trio.
    pub gq_threshold: Option<GqThreshold>,
}

/// Per-call configuration of which categories to use for filtering.
///
/// Categories not mentioned are disabled.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(default)]
pub struct FilterConfig {
    pub denovo: DenovoConfig,
    pub parental_mosaicism: CategoryConfig,
    pub autosomal_recessive_homozygous: CategoryConfig,
    pub xlinked_recessive_homozygous: CategoryConfig,
    pub compound_heterozygous: CategoryConfig,
    pub homozygous_unaffected_siblings: CategoryConfig,
    pub no_coverage_parents: CategoryConfig,
}

impl FilterConfig {
    /// Configuration with all categories enabled and no GQ thresholds.
    pub fn all_enabled() -> Self {
        let enabled = CategoryConfig { enable: true };
        Self {
            denovo: DenovoConfig {
                enable: true,
                gq_threshold: None,
            },
            parental_mosaicism: enabled,
            autosomal_recessive_homozygous: enabled,
            xlinked_recessive_homozygous: enabled,
            compound_heterozygous: enabled,
            homozygous_unaffected_siblings: enabled,
            no_coverage_parents: enabled,
        }
    }

    /// Whether `category` is enabled.
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Denovo => self.denovo.enable,
            Category::ParentalMosaicism => self.parental_mosaicism.enable,
            Category::AutosomalRecessiveHomozygous => self.autosomal_recessive_homozygous.enable,
            Category::XlinkedRecessiveHomozygous => self.xlinked_recessive_homozygous.enable,
            Category::CompoundHeterozygous => self.compound_heterozygous.enable,
            Category::HomozygousUnaffectedSiblings => self.homozygous_unaffected_siblings.enable,
            Category::NoCoverageParents => self.no_coverage_parents.enable,
        }
    }

    /// The enabled flags as an `EnumMap`.
    pub fn enabled(&self) -> EnumMap<Category, bool> {
        EnumMap::from_fn(|category| self.is_enabled(category))
    }

    /// The extras the genotype table needs for this configuration.
    pub fn required_extras(&self) -> Vec<Extra> {
        let mut result = vec![Extra::AlleleRatio, Extra::GenotypeLikelihoods];
        if self.denovo.enable && self.denovo.gq_threshold.is_some() {
            result.push(Extra::GenotypeQuality);
        }
        result
    }
}
