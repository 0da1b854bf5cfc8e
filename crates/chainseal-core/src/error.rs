use thiserror::Error;

/// Errors raised while hashing, mining or building a chain.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("difficulty {difficulty} exceeds the {max} hex digits of a block hash")]
    DifficultyOutOfRange { difficulty: usize, max: usize },

    #[error("no nonce up to {limit} satisfies the difficulty target")]
    NonceLimitReached { limit: u64 },
}

/// First reason a chain fails validation, with the offending block index.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("block {index}: previous_hash does not match the hash of block {}", .index.saturating_sub(1))]
    BrokenLink { index: u64 },

    #[error("block {index}: stored hash does not match its contents")]
    HashMismatch { index: u64 },

    #[error("block {index}: contents cannot be hashed")]
    Unhashable {
        index: u64,
        #[source]
        source: LedgerError,
    },

    #[error("block {index}: hash has fewer than {difficulty} leading zero digits")]
    InsufficientWork { index: u64, difficulty: usize },
}

impl ValidationError {
    pub fn index(&self) -> u64 {
        match self {
            ValidationError::BrokenLink { index }
            | ValidationError::HashMismatch { index }
            | ValidationError::Unhashable { index, .. }
            | ValidationError::InsufficientWork { index, .. } => *index,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
