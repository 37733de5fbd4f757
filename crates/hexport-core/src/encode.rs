//! Hex chunk encoding
//!
//! Bytes are hex-encoded (uppercase, two characters per byte) and split so
//! every chunk except possibly the last covers exactly `chunk_size` source
//! bytes.

use crate::{Error, Result};

/// Source bytes per chunk (200 hex characters per script line).
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Encode `bytes` into ordered uppercase hex chunks of `chunk_size` source bytes.
pub fn encode(bytes: &[u8], chunk_size: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(Error::InvalidChunkSize(chunk_size));
    }

    Ok(bytes.chunks(chunk_size).map(hex::encode_upper).collect())
}

/// Reassemble a chunk sequence into the original bytes.
///
/// Errors carry the 1-based index of the offending chunk, matching the
/// index used in the rendered script.
pub fn decode<S: AsRef<str>>(chunks: &[S]) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(chunks.iter().map(|c| c.as_ref().len() / 2).sum());

    for (i, chunk) in chunks.iter().enumerate() {
        let decoded =
            hex::decode(chunk.as_ref()).map_err(|source| Error::InvalidHex { index: i + 1, source })?;
        bytes.extend_from_slice(&decoded);
    }

    Ok(bytes)
}
