//! Best-effort payload compression before transmission.

use std::io::Write;

use flate2::{Compression, write::GzEncoder};
use tracing::warn;

/// Gzip `data` when `compress` is set.
///
/// Compression is a non-essential optimization: an encoder failure falls back
/// to the raw bytes instead of failing the task. The returned flag always
/// reflects the bytes actually produced, so the receiver knows how to decode
/// them.
pub fn encode(data: &[u8], compress: bool) -> (Vec<u8>, bool) {
    if !compress {
        return (data.to_vec(), false);
    }

    match gzip(data) {
        Ok(compressed) => (compressed, true),
        Err(err) => {
            warn!(error = %err, "compression failed, sending payload uncompressed");
            (data.to_vec(), false)
        }
    }
}

fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
