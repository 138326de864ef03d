//! Gzip compression

use flate2::{write::GzEncoder, Compression};
use std::io::Write;

/// Gzip `data` at the highest compression level
///
/// The header carries no file name and a zero modification time, so equal
/// input always produces equal output.
pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}
