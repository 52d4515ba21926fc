#![allow(dead_code)]

use kgi_core::log::MemoryLog;
use kgi_database::{create_temp_db, prelude::ConnBuilder, utils::DbLifetime};
use kgi_processing::{
    config::Config,
    consensus::MemoryConsensusDataSource,
    model::{Block, BlockColor},
    processor::GraphProcessor,
    stores::GraphDatabase,
    test_helpers::{hash, test_config, test_logger},
};
use std::sync::Arc;

/// A processor over a temp RocksDB, with genesis `hash(0)` already inserted
pub struct TestGraph {
    pub processor: GraphProcessor,
    pub consensus: Arc<MemoryConsensusDataSource>,
    pub log: Arc<MemoryLog>,
    _lifetime: DbLifetime,
}

impl TestGraph {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let (lifetime, db) = create_temp_db!(ConnBuilder::default().with_files_limit(10));
        let consensus = Arc::new(MemoryConsensusDataSource::new());
        let (logger, log) = test_logger();
        let processor = GraphProcessor::new(Arc::new(GraphDatabase::new(db)), consensus.clone(), &config, logger).unwrap();
        Self { processor, consensus, log, _lifetime: lifetime }
    }

    pub fn db(&self) -> &GraphDatabase {
        self.processor.database()
    }

    pub fn block(&self, n: u64) -> Block {
        self.db().block_by_hash(hash(n)).unwrap().unwrap()
    }

    pub fn id(&self, n: u64) -> u64 {
        self.block(n).id
    }

    pub fn state(&self, n: u64) -> (BlockColor, bool) {
        let block = self.block(n);
        (block.color, block.is_in_selected_chain)
    }

    /// Every stored block, in id order
    pub fn all_blocks(&self) -> Vec<Block> {
        (1..).map_while(|id| self.db().block_by_id(id).unwrap()).collect()
    }
}
