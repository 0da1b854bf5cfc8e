use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::error::{LedgerError, Result};

/// Settings fixed for the lifetime of a [`Chain`](crate::Chain).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Required leading zero hex digits in every mined block hash.
    pub difficulty: usize,
    /// Search the nonce space on the rayon thread pool instead of sequentially.
    pub parallel_mining: bool,
}

impl ChainConfig {
    pub fn new(difficulty: usize) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_difficulty(self.difficulty)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            parallel_mining: false,
        }
    }
}

pub(crate) fn check_difficulty(difficulty: usize) -> Result<()> {
    if difficulty > MAX_DIFFICULTY {
        return Err(LedgerError::DifficultyOutOfRange {
            difficulty,
            max: MAX_DIFFICULTY,
        });
    }
    Ok(())
}
