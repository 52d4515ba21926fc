//! Builders for tests. Blocks are addressed by small integers which map to hashes.

use crate::{
    config::{Config, GenesisConfig},
    events::{AcceptedBlock, KnownBlock},
    model::{BlockClassification, SelectedChainChanges},
};
use kaspa_hashes::Hash;
use kgi_core::log::{Logger, MemoryLog};
use std::sync::Arc;

pub fn hash(n: u64) -> Hash {
    Hash::from_u64_word(n)
}

pub fn hashes(ns: &[u64]) -> Vec<Hash> {
    ns.iter().copied().map(hash).collect()
}

pub fn known(n: u64, parents: &[u64]) -> KnownBlock {
    KnownBlock::new(hash(n), hashes(parents), 1_000 * n as i64)
}

pub fn classification(selected_parent: u64, blues: &[u64], reds: &[u64]) -> BlockClassification {
    BlockClassification::new(hash(selected_parent), hashes(blues), hashes(reds))
}

pub fn chain_changes(removed: &[u64], added: &[u64]) -> SelectedChainChanges {
    SelectedChainChanges::new(hashes(removed), hashes(added))
}

pub fn accepted(n: u64, classification: BlockClassification, chain_changes: Option<SelectedChainChanges>) -> AcceptedBlock {
    AcceptedBlock::new(hash(n), classification, chain_changes)
}

/// A logger capturing everything into the returned sink
pub fn test_logger() -> (Logger, Arc<MemoryLog>) {
    let sink = Arc::new(MemoryLog::default());
    (Logger::new("kgi_processing::test", sink.clone()), sink)
}

/// A config whose genesis is `hash(0)`
pub fn test_config() -> Config {
    Config { network: "kgi-test".to_string(), genesis: GenesisConfig { hash: hash(0), timestamp: 0 }, ..Default::default() }
}
