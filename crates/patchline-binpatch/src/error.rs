//! Error types for the binary patch engine.

use std::path::PathBuf;
use thiserror::Error;

/// Digest parsing errors.
#[derive(Debug, Error)]
pub enum DigestError {
    /// Hex string could not be decoded
    #[error("Invalid digest hex: {0}")]
    InvalidHex(String),

    /// Decoded digest has the wrong length
    #[error("Invalid digest size: expected {expected} bytes, got {actual}")]
    InvalidSize {
        /// Expected byte length (32)
        expected: usize,
        /// Actual decoded length
        actual: usize,
    },
}

/// Descriptor table construction errors.
#[derive(Debug, Error)]
pub enum TableError {
    /// Two descriptors share the same source hash.
    ///
    /// Lookup precedence between them would be arbitrary; the table is a
    /// configuration defect and is rejected outright at load time.
    #[error("Duplicate source hash in descriptor table: {0}")]
    DuplicateSource(String),

    /// Digest field failed to parse
    #[error("Invalid descriptor digest: {0}")]
    Digest(#[from] DigestError),
}

/// Patch application errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The file to patch does not exist
    #[error("File to patch does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    /// I/O failure while hashing, copying, or rewriting
    #[error("Patch I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
