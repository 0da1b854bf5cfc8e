use serde::Serialize;
use tracing::info;

use crate::block::{Block, UnsealedBlock};
use crate::config::check_difficulty;
use crate::error::{LedgerError, Result};

/// Mine the block by incrementing the nonce from 0 until the hex hash starts
/// with `difficulty` zero digits. There is no upper bound on the search.
pub fn mine_block<T: Serialize>(block: UnsealedBlock<T>, difficulty: usize) -> Result<Block<T>> {
    check_difficulty(difficulty)?;
    let (nonce, hash) = {
        let input = block.hash_input()?;
        let mut nonce = 0u64;
        loop {
            let hash = input.digest(nonce)?;
            if meets_difficulty(&hash, difficulty) {
                break (nonce, hash);
            }
            nonce = nonce.wrapping_add(1);
        }
    };

    info!(
        "Mined block {} with nonce {} and hash {}",
        block.index(),
        nonce,
        hash
    );
    Ok(block.seal(nonce, hash))
}

/// Like [`mine_block`], but gives up once every nonce in `0..=max_nonce` has
/// been tried.
pub fn mine_bounded<T: Serialize>(
    block: UnsealedBlock<T>,
    difficulty: usize,
    max_nonce: u64,
) -> Result<Block<T>> {
    check_difficulty(difficulty)?;
    let found = {
        let input = block.hash_input()?;
        let mut found = None;
        for nonce in 0..=max_nonce {
            let hash = input.digest(nonce)?;
            if meets_difficulty(&hash, difficulty) {
                found = Some((nonce, hash));
                break;
            }
        }
        found
    };

    let (nonce, hash) = found.ok_or(LedgerError::NonceLimitReached { limit: max_nonce })?;
    info!(
        "Mined block {} with nonce {} and hash {}",
        block.index(),
        nonce,
        hash
    );
    Ok(block.seal(nonce, hash))
}

pub fn leading_zero_digits(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

/// True when the first `difficulty` characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    leading_zero_digits(hash) >= difficulty
}
