use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::block::{Block, UnsealedBlock};
use crate::config::check_difficulty;
use crate::error::{LedgerError, Result};
use crate::pow::meets_difficulty;

/// Mines a block by searching nonces in parallel until the hash has at least
/// `difficulty` leading zero hex digits. Any satisfying nonce may win, not
/// necessarily the smallest.
pub fn mine_block_parallel<T: Serialize>(
    block: UnsealedBlock<T>,
    difficulty: usize,
) -> Result<Block<T>> {
    check_difficulty(difficulty)?;
    let found = {
        // Everything but the nonce is fixed, so the payload is encoded once.
        let input = block.hash_input()?;

        // Rayon splits the whole u64 range across threads.
        (0..=u64::MAX)
            .into_par_iter()
            .find_map_any(|nonce| match input.digest(nonce) {
                Ok(hash) if meets_difficulty(&hash, difficulty) => Some(Ok((nonce, hash))),
                Ok(_) => None,
                Err(err) => Some(Err(err)),
            })
    };

    let (nonce, hash) = found.unwrap_or(Err(LedgerError::NonceLimitReached { limit: u64::MAX }))?;
    info!(
        "Mined block {} with nonce {} and hash {} (parallel)",
        block.index(),
        nonce,
        hash
    );
    Ok(block.seal(nonce, hash))
}
