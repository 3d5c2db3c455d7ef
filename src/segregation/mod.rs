//! Segregation and inheritance filter.
//!
//! Classifies candidate alleles of an analysis into Mendelian transmission categories
//! based on the genotypes of the family and computes de novo posteriors from genotype
//! likelihoods.  See `filter::SegregationFilter` for the entry point.

pub mod category;
pub mod cli;
pub mod conf;
pub mod denovo_probability;
pub mod filter;
pub mod genes;
pub mod genotype_table;
pub mod par;
pub mod pedigree;
pub mod schema;
pub mod storage;
