use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::pow;

/// Current Unix time in seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs()
}

/// The hashed fields of a block, with the payload already in canonical form.
/// Nonce is supplied per digest so one input serves a whole nonce search.
#[derive(Debug)]
pub(crate) struct HashInput<'a> {
    index: u64,
    previous_hash: &'a str,
    timestamp: u64,
    transactions: Value,
}

// Field order is lexicographic and is part of the hash. Do not reorder.
#[derive(Serialize)]
struct Encoded<'a> {
    index: u64,
    nonce: u64,
    previous_hash: &'a str,
    timestamp: u64,
    transactions: &'a Value,
}

impl<'a> HashInput<'a> {
    fn new<T: Serialize>(
        index: u64,
        previous_hash: &'a str,
        timestamp: u64,
        transactions: &[T],
    ) -> Result<Self> {
        // Going through `Value` sorts the keys of any map or struct in the payload.
        let transactions = serde_json::to_value(transactions)?;
        Ok(Self {
            index,
            previous_hash,
            timestamp,
            transactions,
        })
    }

    /// SHA-256 over the compact JSON encoding, as lowercase hex.
    pub(crate) fn digest(&self, nonce: u64) -> Result<String> {
        let bytes = serde_json::to_vec(&Encoded {
            index: self.index,
            nonce,
            previous_hash: self.previous_hash,
            timestamp: self.timestamp,
            transactions: &self.transactions,
        })?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

/// A block whose contents are fixed but which has no nonce or hash yet.
/// The only way to a [`Block`] is through mining (or the genesis constructor).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnsealedBlock<T = String> {
    index: u64,
    previous_hash: String,
    transactions: Vec<T>,
    timestamp: u64,
}

impl<T> UnsealedBlock<T> {
    /// New candidate stamped with the current time.
    pub fn new(index: u64, previous_hash: impl Into<String>, transactions: Vec<T>) -> Self {
        Self::with_timestamp(index, previous_hash, transactions, current_timestamp())
    }

    pub fn with_timestamp(
        index: u64,
        previous_hash: impl Into<String>,
        transactions: Vec<T>,
        timestamp: u64,
    ) -> Self {
        Self {
            index,
            previous_hash: previous_hash.into(),
            transactions,
            timestamp,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn transactions(&self) -> &[T] {
        &self.transactions
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl<T: Serialize> UnsealedBlock<T> {
    pub(crate) fn hash_input(&self) -> Result<HashInput<'_>> {
        HashInput::new(
            self.index,
            &self.previous_hash,
            self.timestamp,
            &self.transactions,
        )
    }

    /// Digest this block would have with the given nonce.
    pub fn calculate_hash(&self, nonce: u64) -> Result<String> {
        self.hash_input()?.digest(nonce)
    }

    /// Search for a nonce whose hash has `difficulty` leading zero hex digits.
    /// Runs until one is found.
    pub fn mine(self, difficulty: usize) -> Result<Block<T>> {
        pow::mine_block(self, difficulty)
    }

    /// Seal at a chosen nonce without any proof-of-work check.
    pub(crate) fn seal_at(self, nonce: u64) -> Result<Block<T>> {
        let hash = self.calculate_hash(nonce)?;
        Ok(self.seal(nonce, hash))
    }

    pub(crate) fn seal(self, nonce: u64, hash: String) -> Block<T> {
        Block {
            index: self.index,
            previous_hash: self.previous_hash,
            transactions: self.transactions,
            timestamp: self.timestamp,
            nonce,
            hash,
        }
    }
}

/// A sealed block: contents plus the nonce and hash that seal them.
///
/// Fields are read through accessors. The `*_mut`/`set_*`/`refresh_hash`
/// methods exist to tamper with stored history; doing so is never an error by
/// itself and only shows up when the chain is validated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block<T = String> {
    index: u64,
    previous_hash: String,
    transactions: Vec<T>,
    timestamp: u64,
    nonce: u64,
    hash: String,
}

impl<T> Block<T> {
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn transactions(&self) -> &[T] {
        &self.transactions
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Stored hash, as sealed. Not recomputed.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Whether the stored hash has at least `difficulty` leading zero hex digits.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        pow::meets_difficulty(&self.hash, difficulty)
    }

    pub fn transactions_mut(&mut self) -> &mut Vec<T> {
        &mut self.transactions
    }

    pub fn set_previous_hash(&mut self, previous_hash: impl Into<String>) {
        self.previous_hash = previous_hash.into();
    }
}

impl<T: Serialize> Block<T> {
    /// Digest of the current field values, ignoring the stored hash.
    pub fn calculate_hash(&self) -> Result<String> {
        HashInput::new(
            self.index,
            &self.previous_hash,
            self.timestamp,
            &self.transactions,
        )?
        .digest(self.nonce)
    }

    /// False when the contents changed since sealing, or cannot be hashed.
    pub fn is_hash_consistent(&self) -> bool {
        self.calculate_hash()
            .map(|hash| hash == self.hash)
            .unwrap_or(false)
    }

    /// Overwrite the stored hash with a fresh digest of the current contents.
    /// The nonce is left alone, so the result usually no longer meets the
    /// difficulty target.
    pub fn refresh_hash(&mut self) -> Result<&str> {
        self.hash = self.calculate_hash()?;
        Ok(&self.hash)
    }
}
