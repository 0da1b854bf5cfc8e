use serde::Serialize;
use tracing::{debug, info, warn};

use crate::block::{Block, UnsealedBlock};
use crate::config::ChainConfig;
use crate::constants::GENESIS_PREVIOUS_HASH;
use crate::error::{Result, ValidationError};
use crate::{mine, pow};

/// An owned, append-only sequence of sealed blocks rooted at a genesis block.
///
/// A chain always holds at least its genesis block. It is not synchronized:
/// callers sharing one across threads must hold a lock around [`add_block`]
/// themselves.
///
/// [`add_block`]: Chain::add_block
#[derive(Clone, Debug)]
pub struct Chain<T = String> {
    blocks: Vec<Block<T>>,
    config: ChainConfig,
}

impl<T: Serialize> Chain<T> {
    /// Chain with the given difficulty and sequential mining.
    pub fn new(difficulty: usize) -> Result<Self> {
        Self::with_config(ChainConfig::new(difficulty))
    }

    pub fn with_config(config: ChainConfig) -> Result<Self> {
        config.validate()?;
        let genesis = genesis_block()?;
        info!(
            "Created chain with difficulty {} and genesis hash {}",
            config.difficulty,
            genesis.hash()
        );
        Ok(Self {
            blocks: vec![genesis],
            config,
        })
    }

    /// Mine `transactions` into a new block on top of the current tip and
    /// append it. Blocks until mining finishes.
    pub fn add_block(&mut self, transactions: Vec<T>) -> Result<&Block<T>> {
        let index = self.blocks.len() as u64;
        let previous_hash = self.get_latest_block().hash().to_string();
        let candidate = UnsealedBlock::new(index, previous_hash, transactions);
        debug!(
            "Mining block {} at difficulty {}",
            index, self.config.difficulty
        );

        let block = if self.config.parallel_mining {
            mine::mine_block_parallel(candidate, self.config.difficulty)?
        } else {
            pow::mine_block(candidate, self.config.difficulty)?
        };
        self.blocks.push(block);
        Ok(self.get_latest_block())
    }

    /// True when every block after genesis links to its predecessor and its
    /// stored hash matches its contents. Proof-of-work is not re-checked.
    pub fn is_chain_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Same checks as [`is_chain_valid`](Chain::is_chain_valid), reporting the
    /// first failure.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        self.scan(None)
    }

    /// [`validate`](Chain::validate) plus a check that every block after
    /// genesis still meets the chain difficulty.
    pub fn validate_strict(&self) -> std::result::Result<(), ValidationError> {
        self.scan(Some(self.config.difficulty))
    }

    fn scan(&self, difficulty: Option<usize>) -> std::result::Result<(), ValidationError> {
        // Genesis is the root of trust and is not checked on its own.
        for (i, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let index = (i + 1) as u64;
            if let Err(err) = check_block(index, previous, current, difficulty) {
                warn!("Chain validation failed: {}", err);
                return Err(err);
            }
        }
        debug!("Validated chain of {} blocks", self.blocks.len());
        Ok(())
    }
}

impl<T> Chain<T> {
    /// The tip of the chain.
    pub fn get_latest_block(&self) -> &Block<T> {
        self.blocks
            .last()
            .expect("chain always holds its genesis block")
    }

    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: genesis is present from construction.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block<T>] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block<T>> {
        self.blocks.get(index)
    }

    /// Direct access to a stored block, for tampering with history.
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block<T>> {
        self.blocks.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block<T>> {
        self.blocks.iter()
    }
}

impl<'a, T> IntoIterator for &'a Chain<T> {
    type Item = &'a Block<T>;
    type IntoIter = std::slice::Iter<'a, Block<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_block<T: Serialize>(
    index: u64,
    previous: &Block<T>,
    current: &Block<T>,
    difficulty: Option<usize>,
) -> std::result::Result<(), ValidationError> {
    if current.previous_hash() != previous.hash() {
        return Err(ValidationError::BrokenLink { index });
    }
    match current.calculate_hash() {
        Ok(hash) if hash == current.hash() => {}
        Ok(_) => return Err(ValidationError::HashMismatch { index }),
        Err(source) => return Err(ValidationError::Unhashable { index, source }),
    }
    if let Some(difficulty) = difficulty {
        if !current.meets_difficulty(difficulty) {
            return Err(ValidationError::InsufficientWork { index, difficulty });
        }
    }
    Ok(())
}

/// Index 0, sentinel previous hash, empty payload, hashed at nonce 0.
/// Not mined, so its hash need not meet any difficulty.
pub fn genesis_block<T: Serialize>() -> Result<Block<T>> {
    UnsealedBlock::new(0, GENESIS_PREVIOUS_HASH, Vec::new()).seal_at(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;

    #[test]
    fn genesis_block_example() {
        let genesis: Block = genesis_block().unwrap();
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.previous_hash(), "0");
        assert!(genesis.transactions().is_empty());
        assert_eq!(genesis.nonce(), 0);
        assert!(genesis.is_genesis());
        assert!(genesis.is_hash_consistent());
    }

    #[test]
    fn fresh_chain_is_valid() {
        let chain: Chain = Chain::new(4).unwrap();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
        assert_eq!(chain.difficulty(), 4);
        assert!(chain.get_latest_block().is_genesis());
        assert!(chain.is_chain_valid());
        assert!(chain.validate_strict().is_ok());
    }

    #[test]
    fn with_config_rejects_impossible_difficulty() {
        let result: Result<Chain> = Chain::with_config(ChainConfig::new(65));
        assert!(matches!(
            result,
            Err(LedgerError::DifficultyOutOfRange { .. })
        ));
    }

    #[test]
    fn add_block_links_to_tip() {
        let mut chain: Chain = Chain::new(2).unwrap();
        let tip = chain.get_latest_block().hash().to_string();
        let block = chain.add_block(vec!["A".to_string()]).unwrap();
        assert_eq!(block.index(), 1);
        assert_eq!(block.previous_hash(), tip);
        assert!(block.hash().starts_with("00"));
        assert_eq!(chain.len(), 2);
        assert!(chain.is_chain_valid());
    }

    #[test]
    fn parallel_chain_is_valid() {
        let config = ChainConfig {
            difficulty: 2,
            parallel_mining: true,
        };
        let mut chain: Chain = Chain::with_config(config).unwrap();
        chain.add_block(vec!["A".to_string()]).unwrap();
        chain.add_block(vec!["B".to_string()]).unwrap();
        assert_eq!(chain.len(), 3);
        assert!(chain.validate_strict().is_ok());
    }

    #[test]
    fn validate_reports_hash_mismatch() {
        let mut chain: Chain = Chain::new(1).unwrap();
        chain.add_block(vec!["A".to_string()]).unwrap();
        chain.add_block(vec!["B".to_string()]).unwrap();
        chain.block_mut(2).unwrap().transactions_mut().push("C".to_string());
        assert!(matches!(
            chain.validate(),
            Err(ValidationError::HashMismatch { index: 2 })
        ));
        assert!(!chain.is_chain_valid());
    }

    #[test]
    fn validate_reports_broken_link() {
        let mut chain: Chain = Chain::new(1).unwrap();
        chain.add_block(vec!["A".to_string()]).unwrap();
        let block = chain.block_mut(1).unwrap();
        block.set_previous_hash("f".repeat(64));
        block.refresh_hash().unwrap();
        assert!(matches!(
            chain.validate(),
            Err(ValidationError::BrokenLink { index: 1 })
        ));
    }

    #[test]
    fn genesis_is_not_revalidated() {
        let mut chain: Chain = Chain::new(1).unwrap();
        chain
            .block_mut(0)
            .unwrap()
            .transactions_mut()
            .push("rewritten".to_string());
        assert!(chain.is_chain_valid());
    }

    #[test]
    fn strict_validation_catches_weak_blocks() {
        let mut chain: Chain = Chain::new(2).unwrap();
        chain.add_block(vec!["A".to_string()]).unwrap();

        // Re-seal block 1 with no work, keeping linkage and hash consistent.
        let unsealed = UnsealedBlock::with_timestamp(
            1,
            chain.block(0).unwrap().hash(),
            vec!["A".to_string()],
            chain.block(1).unwrap().timestamp(),
        );
        let mut nonce = 0;
        let weak = loop {
            let block = unsealed.clone().seal_at(nonce).unwrap();
            if !block.meets_difficulty(2) {
                break block;
            }
            nonce += 1;
        };
        *chain.block_mut(1).unwrap() = weak;

        assert!(chain.is_chain_valid());
        assert!(matches!(
            chain.validate_strict(),
            Err(ValidationError::InsufficientWork {
                index: 1,
                difficulty: 2
            })
        ));
    }

    #[test]
    fn iterates_in_order() {
        let mut chain: Chain = Chain::new(1).unwrap();
        chain.add_block(vec!["A".to_string()]).unwrap();
        chain.add_block(vec!["B".to_string()]).unwrap();
        let indices: Vec<u64> = chain.iter().map(|b| b.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!((&chain).into_iter().count(), chain.blocks().len());
    }
}
