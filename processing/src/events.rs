use crate::model::{BlockClassification, SelectedChainChanges};
use kaspa_hashes::Hash;

/// A block which became known to the consensus engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnownBlock {
    pub hash: Hash,
    pub parents: Vec<Hash>,
    pub timestamp: i64,
}

impl KnownBlock {
    pub fn new(hash: Hash, parents: Vec<Hash>, timestamp: i64) -> Self {
        Self { hash, parents, timestamp }
    }
}

/// A block fully accepted by the consensus engine.
///
/// `chain_changes` is absent when the acceptance did not move the selected chain, e.g. during
/// bulk sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptedBlock {
    pub hash: Hash,
    pub classification: BlockClassification,
    pub chain_changes: Option<SelectedChainChanges>,
}

impl AcceptedBlock {
    pub fn new(hash: Hash, classification: BlockClassification, chain_changes: Option<SelectedChainChanges>) -> Self {
        Self { hash, classification, chain_changes }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphEvent {
    BlockKnown(KnownBlock),
    BlockAccepted(AcceptedBlock),
}

impl GraphEvent {
    pub fn hash(&self) -> Hash {
        match self {
            GraphEvent::BlockKnown(block) => block.hash,
            GraphEvent::BlockAccepted(block) => block.hash,
        }
    }
}

impl From<KnownBlock> for GraphEvent {
    fn from(block: KnownBlock) -> Self {
        GraphEvent::BlockKnown(block)
    }
}

impl From<AcceptedBlock> for GraphEvent {
    fn from(block: AcceptedBlock) -> Self {
        GraphEvent::BlockAccepted(block)
    }
}
