//! Common functionality.

use biocommons_bioutils::assemblies::{Assembly, ASSEMBLY_INFOS};
use bytesize::ByteSize;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Helper to print the current memory resident set size via `tracing`.
pub fn trace_rss_now() {
    let rss = procfs::process::Process::myself()
        .and_then(|me| me.stat())
        .map(|stat| stat.rss * procfs::page_size());
    match rss {
        Ok(rss) => tracing::debug!("RSS now: {}", ByteSize::b(rss)),
        Err(e) => tracing::debug!("could not determine RSS: {}", e),
    }
}

/// Definition of canonical chromosome names.
pub const CHROMS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X", "Y", "MT",
];

/// Strip the `chr` prefix of a chromosome name and normalize the mitochondrial name.
///
/// Unknown contig names are returned without their prefix but otherwise unchanged.
pub fn canonicalize_chrom(chrom: &str) -> String {
    let stripped = match chrom.get(..3) {
        Some(prefix) if chrom.len() > 3 && prefix.eq_ignore_ascii_case("chr") => &chrom[3..],
        _ => chrom,
    };
    let upper = stripped.to_ascii_uppercase();
    if upper == "M" {
        String::from("MT")
    } else if CHROMS.contains(&upper.as_str()) {
        upper
    } else {
        stripped.to_owned()
    }
}

/// Whether the given chromosome name denotes chromosome X.
pub fn is_chrom_x(chrom: &str) -> bool {
    canonicalize_chrom(chrom) == "X"
}

/// Select the genome release to use.
#[derive(
    clap::ValueEnum,
    Clone,
    Copy,
    Debug,
    strum::Display,
    PartialEq,
    Eq,
    enum_map::Enum,
    PartialOrd,
    Ord,
    Hash,
)]
pub enum GenomeRelease {
    // GRCh37 / hg19
    #[strum(serialize = "grch37")]
    Grch37,
    /// GRCh38 / hg38
    #[strum(serialize = "grch38")]
    Grch38,
}

impl From<GenomeRelease> for Assembly {
    fn from(val: GenomeRelease) -> Self {
        match val {
            GenomeRelease::Grch37 => Assembly::Grch37p10,
            GenomeRelease::Grch38 => Assembly::Grch38,
        }
    }
}

impl std::str::FromStr for GenomeRelease {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        if s.starts_with("grch37") {
            Ok(GenomeRelease::Grch37)
        } else if s.starts_with("grch38") {
            Ok(GenomeRelease::Grch38)
        } else {
            Err(anyhow::anyhow!("Unknown genome release: {}", s))
        }
    }
}

/// Map a RefSeq accession of `release` to the chromosome name.
///
/// Other names are returned unchanged.
pub fn resolve_accession(release: GenomeRelease, chrom: &str) -> String {
    let assembly: Assembly = release.into();
    ASSEMBLY_INFOS[assembly]
        .sequences
        .iter()
        .find(|sequence| sequence.refseq_ac == chrom)
        .map(|sequence| sequence.name.clone())
        .unwrap_or_else(|| chrom.to_owned())
}
