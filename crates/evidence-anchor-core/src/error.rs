use thiserror::Error;

/// Errors raised by the anchoring side (store, ledger, service).
#[derive(Error, Debug)]
pub enum AnchorError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A block does not link to its predecessor or its index is out of
    /// sequence. Never expected under single-writer discipline; the operation
    /// that observes it must abort.
    #[error("chain integrity violation at block {index}: {reason}")]
    ChainIntegrity { index: u64, reason: String },

    #[error("content store failure: {0}")]
    Storage(String),

    #[error("ledger journal failure: {0}")]
    Journal(String),
}

pub type Result<T> = std::result::Result<T, AnchorError>;
