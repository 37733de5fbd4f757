use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid chunk size: {0} (must be greater than zero)")]
    InvalidChunkSize(usize),

    #[error("Unsafe logical name '{0}': only [A-Za-z0-9/_.-] characters are allowed")]
    InvalidLogicalName(String),

    #[error("Invalid fallback id policy: {0}")]
    InvalidFallbackPolicy(String),

    #[error("Invalid hex in chunk {index}: {source}")]
    InvalidHex {
        index: usize,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
