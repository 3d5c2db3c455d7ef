//! Error types of the segregation filter.

use crate::segregation::schema::{AlleleId, Extra, SampleId};

/// Errors when resolving the pedigree of an analysis.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PedigreeError {
    #[error("Multiple families in analysis: {0:?}")]
    MultipleFamilies(Vec<String>),
    #[error("No affected proband found in analysis")]
    NoProband,
    #[error("Multiple affected probands found in analysis: {0:?}")]
    MultipleProbands(Vec<SampleId>),
    #[error("Found more than one father linked to proband: {0:?}")]
    MultipleFathers(Vec<SampleId>),
    #[error("Found more than one mother linked to proband: {0:?}")]
    MultipleMothers(Vec<SampleId>),
}

/// Errors raised by the segregation filter.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SegregationError {
    #[error("Unsupported genome reference {reference:?} for allele {allele_id}")]
    UnsupportedReference {
        allele_id: AlleleId,
        reference: String,
    },
    #[error("Invalid pedigree: {0}")]
    Pedigree(#[from] PedigreeError),
    #[error("Genotype table lacks required extra {0}")]
    MissingRequiredExtra(Extra),
    #[error("Inconsistent genotype table: {0}")]
    InconsistentGenotypeTable(String),
    #[error("Proband dosage {proband} is shared with a parent in de novo mode (father={father}, mother={mother})")]
    InvalidDenovoMode { father: u8, mother: u8, proband: u8 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Problem with the data store: {0}")]
    Store(String),
    #[error("Segregation filter was cancelled")]
    Cancelled,
}

impl SegregationError {
    /// Whether the error aborts the whole call rather than a single analysis.
    pub fn aborts_call(&self) -> bool {
        matches!(
            self,
            SegregationError::UnsupportedReference { .. } | SegregationError::Cancelled
        )
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{PedigreeError, SegregationError};

    #[test]
    fn display_pedigree_error() {
        let err = SegregationError::from(PedigreeError::MultipleFamilies(vec![
            String::from("FAM1"),
            String::from("FAM2"),
        ]));

        assert_eq!(
            err.to_string(),
            "Invalid pedigree: Multiple families in analysis: [\"FAM1\", \"FAM2\"]"
        );
        assert!(!err.aborts_call());
    }

    #[test]
    fn unsupported_reference_aborts() {
        let err = SegregationError::UnsupportedReference {
            allele_id: 1,
            reference: String::from("GRCh38"),
        };

        assert!(err.aborts_call());
        assert!(SegregationError::Cancelled.aborts_call());
    }
}
