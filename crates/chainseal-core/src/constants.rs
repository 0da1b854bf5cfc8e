pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Leading zero hex digits a sealed block hash needs unless configured otherwise.
pub const DEFAULT_DIFFICULTY: usize = 4;
/// Upper bound on difficulty: every hex digit of the digest is zero.
pub const MAX_DIFFICULTY: usize = HASH_HEX_SIZE;
/// `previous_hash` of the genesis block. Not a digest, it has no referent.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
