//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Transparently open a file with gzip decoder.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path)?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path).map(BufReader::new)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> Result<Box<dyn Write>, anyhow::Error>
where
    P: AsRef<Path>,
{
    if path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz")) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(Box::new(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Read JSON from the given path, transparently decompressing `.gz` files.
pub fn read_json<T, P>(path: P) -> Result<T, anyhow::Error>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let reader = open_read_maybe_gz(path.as_ref())?;
    serde_json::from_reader(reader)
        .map_err(|e| anyhow::anyhow!("could not parse JSON from {:?}: {}", path.as_ref(), e))
}

/// Write `value` as pretty-printed JSON to the given path.
pub fn write_json<T, P>(path: P, value: &T) -> Result<(), anyhow::Error>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let mut writer = open_write_maybe_gz(path.as_ref())?;
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| anyhow::anyhow!("could not write JSON to {:?}: {}", path.as_ref(), e))?;
    writer.flush()?;
    Ok(())
}
