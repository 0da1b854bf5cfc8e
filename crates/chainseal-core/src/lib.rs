//! Append-only ledger of transaction batches. Each block is bound to its
//! predecessor by hash and sealed by a proof-of-work search over its nonce.

pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod mine;
pub mod pow;

pub use block::{Block, UnsealedBlock};
pub use chain::{genesis_block, Chain};
pub use config::ChainConfig;
pub use error::{LedgerError, Result, ValidationError};
