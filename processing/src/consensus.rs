use crate::model::BlockClassification;
use kaspa_hashes::Hash;
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

/// Read access to classifications already computed by the consensus engine
pub trait ConsensusDataSource: Send + Sync {
    fn get_classification(&self, hash: Hash) -> Option<BlockClassification>;
}

pub type DynConsensusDataSource = Arc<dyn ConsensusDataSource>;

/// A classification source fed by whoever delivers the consensus events
#[derive(Default)]
pub struct MemoryConsensusDataSource {
    classifications: RwLock<HashMap<Hash, BlockClassification>>,
}

impl MemoryConsensusDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, hash: Hash, classification: BlockClassification) {
        self.classifications.write().insert(hash, classification);
    }
}

impl ConsensusDataSource for MemoryConsensusDataSource {
    fn get_classification(&self, hash: Hash) -> Option<BlockClassification> {
        self.classifications.read().get(&hash).cloned()
    }
}
