//! Error types for notarychain

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// A candidate block failed chain-link validation (continuity, linkage,
    /// or integrity). The ledger is left untouched; the caller may re-mine
    /// against the new tip.
    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    /// A candidate's hash does not satisfy its declared difficulty.
    #[error("Invalid proof of work: hash does not meet the difficulty target")]
    InvalidProofOfWork,

    /// The mining search observed its cancellation handle before finding a
    /// winning nonce.
    #[error("Mining cancelled before a valid nonce was found")]
    MiningCancelled,

    /// The mining task failed to run to completion.
    #[error("Mining failed: {0}")]
    Mining(String),

    /// Configuration could not be loaded or validated. Fatal: no ledger
    /// operation is meaningful without a difficulty constant and a tip.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
