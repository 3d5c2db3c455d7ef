//! Gene symbol lookup for alleles, used for grouping compound heterozygous candidates.
//!
//! Symbols are used instead of numeric gene ids as the symbols are the more complete
//! key in the annotation data.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

use crate::segregation::schema::{AlleleId, AnnotationTranscript};

/// Mapping from allele id to the gene symbols of its annotated transcripts.
pub type GeneSymbols = BTreeMap<AlleleId, BTreeSet<String>>;

/// Compute the gene symbols for `allele_ids`.
///
/// Only transcripts whose name matches `inclusion_regex` (if any) are considered.
/// Alleles without any matching transcript do not appear in the result.
pub fn gene_symbols(
    allele_ids: &BTreeSet<AlleleId>,
    transcripts: &[AnnotationTranscript],
    inclusion_regex: Option<&Regex>,
) -> GeneSymbols {
    let mut result = GeneSymbols::new();
    for transcript in transcripts {
        if !allele_ids.contains(&transcript.allele_id) {
            continue;
        }
        if let Some(regex) = inclusion_regex {
            if !regex.is_match(&transcript.transcript_name) {
                continue;
            }
        }
        result
            .entry(transcript.allele_id)
            .or_default()
            .insert(transcript.symbol.clone());
    }
    result
}

/// Invert `symbols` into a mapping from gene symbol to allele ids.
pub fn alleles_by_symbol(symbols: &GeneSymbols) -> BTreeMap<&str, BTreeSet<AlleleId>> {
    let mut result: BTreeMap<&str, BTreeSet<AlleleId>> = BTreeMap::new();
    for (allele_id, allele_symbols) in symbols {
        for symbol in allele_symbols {
            result.entry(symbol.as_str()).or_default().insert(*allele_id);
        }
    }
    result
}
