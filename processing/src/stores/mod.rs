//! The storage contract of the graph. Readers serve both committed state and open
//! transactions; every write of a single graph update goes through one [`GraphStore`]
//! which the caller commits or discards as a whole.

mod db;
mod memory;

pub use db::{DbGraphStore, GraphDatabase, GraphStores, GraphTransaction};
pub use memory::MemoryGraphStore;

use crate::model::{Block, BlockColorUpdates, BlockId, ChainMembershipUpdates, Edge, NewBlock, StoreIdentity};
use kaspa_hashes::Hash;
use kgi_database::prelude::StoreResult;

/// Id assigned to the first block inserted into an empty store
pub const FIRST_BLOCK_ID: BlockId = 1;

pub trait GraphStoreReader {
    fn block_exists(&self, hash: Hash) -> StoreResult<bool>;

    /// Fails with `StoreError::HashNotFound` if the hash is unknown
    fn block_id_by_hash(&self, hash: Hash) -> StoreResult<BlockId>;

    /// Resolves all hashes in order. Fails on the first unknown hash
    fn block_ids_by_hashes(&self, hashes: &[Hash]) -> StoreResult<Vec<BlockId>> {
        hashes.iter().map(|&hash| self.block_id_by_hash(hash)).collect()
    }

    fn block(&self, id: BlockId) -> StoreResult<Block>;

    fn height_of(&self, id: BlockId) -> StoreResult<u64> {
        Ok(self.block(id)?.height)
    }

    fn height_group_index_of(&self, id: BlockId) -> StoreResult<u32> {
        Ok(self.block(id)?.height_group_index)
    }

    /// The number of blocks at `height`, zero for a height never seen
    fn height_group_size(&self, height: u64) -> StoreResult<u32>;

    fn edge(&self, from: BlockId, to: BlockId) -> StoreResult<Edge>;

    fn store_identity(&self) -> StoreResult<StoreIdentity>;
}

pub trait GraphStore: GraphStoreReader {
    /// Inserts a new block row and returns its freshly assigned id.
    /// Fails with `StoreError::HashAlreadyExists` if the hash is already stored.
    fn insert_block(&mut self, block: NewBlock) -> StoreResult<BlockId>;

    fn insert_or_update_height_group(&mut self, height: u64, size: u32) -> StoreResult<()>;

    /// Edges are immutable. Fails with `StoreError::KeyAlreadyExists` if the pair is already linked.
    fn insert_edge(&mut self, edge: Edge) -> StoreResult<()>;

    fn update_selected_parent(&mut self, id: BlockId, selected_parent_id: BlockId) -> StoreResult<()>;

    fn update_merge_set_classification(&mut self, id: BlockId, blue_ids: Vec<BlockId>, red_ids: Vec<BlockId>) -> StoreResult<()>;

    fn apply_chain_membership(&mut self, updates: &ChainMembershipUpdates) -> StoreResult<()>;

    fn apply_colors(&mut self, updates: &BlockColorUpdates) -> StoreResult<()>;

    fn set_store_identity(&mut self, identity: &StoreIdentity) -> StoreResult<()>;
}
