use chainseal_core::Chain;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing() {
    // Several tests share one process; only the first install wins.
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A chain at `difficulty` with one block per payload, each holding a single
/// string transaction.
pub fn chain_with_payloads(difficulty: usize, payloads: &[&str]) -> anyhow::Result<Chain> {
    let mut chain = Chain::new(difficulty)?;
    for payload in payloads {
        chain.add_block(vec![payload.to_string()])?;
    }
    Ok(chain)
}
