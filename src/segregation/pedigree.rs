//! Resolution of the family structure of an analysis.

use itertools::Itertools;

use crate::{
    err::PedigreeError,
    segregation::schema::{Sample, SampleId, Sex},
};

/// The family members of an analysis relevant for segregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pedigree {
    /// The family all members belong to.
    pub family_id: String,
    /// The affected proband.
    pub proband: Sample,
    /// The proband's father, if part of the analysis.
    pub father: Option<Sample>,
    /// The proband's mother, if part of the analysis.
    pub mother: Option<Sample>,
    /// Affected siblings of the proband.
    pub affected_siblings: Vec<Sample>,
    /// Unaffected siblings of the proband.
    pub unaffected_siblings: Vec<Sample>,
}

impl Pedigree {
    /// Resolve the pedigree from the samples of one analysis.
    ///
    /// Returns `Ok(None)` if none of the samples has a family id.
    ///
    /// # Errors
    ///
    /// * `PedigreeError::MultipleFamilies` if the samples belong to more than one family.
    /// * `PedigreeError::NoProband` / `PedigreeError::MultipleProbands` unless there is
    ///   exactly one affected proband.
    /// * `PedigreeError::MultipleFathers` / `PedigreeError::MultipleMothers` if the
    ///   proband's parent links are ambiguous.
    pub fn resolve(samples: &[Sample]) -> Result<Option<Self>, PedigreeError> {
        let family_ids = samples
            .iter()
            .filter_map(|sample| sample.family_id.clone())
            .unique()
            .sorted()
            .collect::<Vec<_>>();
        let family_id = match family_ids.len() {
            0 => return Ok(None),
            1 => family_ids[0].clone(),
            _ => return Err(PedigreeError::MultipleFamilies(family_ids)),
        };

        let probands = samples
            .iter()
            .filter(|sample| sample.proband && sample.affected)
            .collect::<Vec<_>>();
        let proband = match probands.as_slice() {
            [] => return Err(PedigreeError::NoProband),
            [proband] => (*proband).clone(),
            _ => {
                return Err(PedigreeError::MultipleProbands(
                    probands.iter().map(|sample| sample.id).collect(),
                ))
            }
        };

        let father = Self::single_parent(samples, proband.father_id)
            .map_err(PedigreeError::MultipleFathers)?;
        let mother = Self::single_parent(samples, proband.mother_id)
            .map_err(PedigreeError::MultipleMothers)?;

        let (affected_siblings, unaffected_siblings): (Vec<_>, Vec<_>) = samples
            .iter()
            .filter(|sample| {
                sample.sibling_id == Some(proband.id)
                    && sample.family_id.as_deref() == Some(family_id.as_str())
            })
            .cloned()
            .partition(|sample| sample.affected);

        tracing::debug!(
            "resolved family {} with proband {} (father: {:?}, mother: {:?}, {} affected / {} unaffected siblings)",
            &family_id,
            &proband.identifier,
            father.as_ref().map(|s| &s.identifier),
            mother.as_ref().map(|s| &s.identifier),
            affected_siblings.len(),
            unaffected_siblings.len(),
        );

        Ok(Some(Self {
            family_id,
            proband,
            father,
            mother,
            affected_siblings,
            unaffected_siblings,
        }))
    }

    /// Find the sample for `parent_id`; the error carries all ids if ambiguous.
    fn single_parent(
        samples: &[Sample],
        parent_id: Option<SampleId>,
    ) -> Result<Option<Sample>, Vec<SampleId>> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };
        let matches = samples
            .iter()
            .filter(|sample| sample.id == parent_id)
            .collect::<Vec<_>>();
        match matches.as_slice() {
            [] => Ok(None),
            [parent] => Ok(Some((*parent).clone())),
            _ => Err(matches.iter().map(|sample| sample.id).collect()),
        }
    }

    /// Whether both parents are part of the analysis.
    pub fn has_parents(&self) -> bool {
        self.father.is_some() && self.mother.is_some()
    }

    /// Both parents, if present.
    pub fn parents(&self) -> Option<(&Sample, &Sample)> {
        self.father.as_ref().zip(self.mother.as_ref())
    }

    /// Whether the proband is male.
    pub fn proband_is_male(&self) -> bool {
        self.proband.sex == Sex::Male
    }

    /// All family members, proband first.
    pub fn members(&self) -> impl Iterator<Item = &Sample> {
        std::iter::once(&self.proband)
            .chain(self.father.iter())
            .chain(self.mother.iter())
            .chain(self.affected_siblings.iter())
            .chain(self.unaffected_siblings.iter())
    }

    /// The ids of all family members, proband first.
    pub fn sample_ids(&self) -> Vec<SampleId> {
        self.members().map(|sample| sample.id).collect()
    }
}
