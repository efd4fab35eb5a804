//! JSON loading for extractor output
//!
//! Older extractor builds write some documents in a legacy single-byte
//! encoding. Bytes that are not valid UTF-8 are decoded as Latin-1 and
//! parsed again.

use serde::de::DeserializeOwned;
use std::path::Path;

/// Why a document could not be loaded
#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("JSON error: {0}")]
    Parse(serde_json::Error),
}

/// Read and deserialize a JSON document, falling back to Latin-1
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T, ReadError> {
    let bytes = std::fs::read(path).map_err(ReadError::Io)?;
    parse(&bytes).map_err(ReadError::Parse)
}

/// Deserialize JSON bytes, falling back to Latin-1 when they aren't UTF-8
pub fn parse<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    match std::str::from_utf8(bytes) {
        Ok(text) => serde_json::from_str(text),
        Err(_) => serde_json::from_str(&decode_latin1(bytes)),
    }
}

/// Every Latin-1 byte maps to the code point of the same value
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
