use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Decompression error: {0}")]
    Decompression(#[from] lz4_flex::block::DecompressError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Schema mismatch: found {found}, expected {expected}")]
    SchemaMismatch { found: String, expected: String },

    #[error("Corrupted cache: {0}")]
    Corrupted(String),

    #[error(transparent)]
    Core(#[from] pa_core::CoreError),
}

impl CacheError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            CacheError::Io(_) => true,
            CacheError::SchemaMismatch { .. } => true, // Rebuild from source
            CacheError::ChecksumMismatch { .. } => false,
            CacheError::Corrupted(_) => false,
            CacheError::Core(e) => e.is_capacity(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
