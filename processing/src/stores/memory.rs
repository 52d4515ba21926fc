use super::{FIRST_BLOCK_ID, GraphStore, GraphStoreReader};
use crate::model::{Block, BlockColorUpdates, BlockId, ChainMembershipUpdates, Edge, NewBlock, StoreIdentity};
use kaspa_hashes::Hash;
use kgi_database::{
    prelude::{DbKey, StoreError, StoreResult},
    registry::DatabaseStorePrefixes,
};
use std::collections::{BTreeMap, HashMap};

/// An in-memory graph store. Writes apply immediately, so it offers no atomicity of its own
/// and is meant for tests and single-threaded embedders.
#[derive(Clone, Debug)]
pub struct MemoryGraphStore {
    blocks: BTreeMap<BlockId, Block>,
    block_ids: HashMap<Hash, BlockId>,
    edges: BTreeMap<(BlockId, BlockId), Edge>,
    height_groups: HashMap<u64, u32>,
    next_block_id: BlockId,
    identity: Option<StoreIdentity>,
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self {
            blocks: BTreeMap::new(),
            block_ids: HashMap::new(),
            edges: BTreeMap::new(),
            height_groups: HashMap::new(),
            next_block_id: FIRST_BLOCK_ID,
            identity: None,
        }
    }
}

fn missing(prefix: DatabaseStorePrefixes, key: impl AsRef<[u8]>) -> StoreError {
    StoreError::KeyNotFound(DbKey::new(prefix.as_ref(), key))
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges from `id` to its parents, ordered by parent id
    pub fn edges_from(&self, id: BlockId) -> Vec<Edge> {
        self.edges.range((id, BlockId::MIN)..=(id, BlockId::MAX)).map(|(_, edge)| *edge).collect()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    fn block_mut(&mut self, id: BlockId) -> StoreResult<&mut Block> {
        self.blocks.get_mut(&id).ok_or_else(|| missing(DatabaseStorePrefixes::Blocks, id.to_be_bytes()))
    }
}

impl GraphStoreReader for MemoryGraphStore {
    fn block_exists(&self, hash: Hash) -> StoreResult<bool> {
        Ok(self.block_ids.contains_key(&hash))
    }

    fn block_id_by_hash(&self, hash: Hash) -> StoreResult<BlockId> {
        self.block_ids.get(&hash).copied().ok_or(StoreError::HashNotFound(hash))
    }

    fn block(&self, id: BlockId) -> StoreResult<Block> {
        self.blocks.get(&id).cloned().ok_or_else(|| missing(DatabaseStorePrefixes::Blocks, id.to_be_bytes()))
    }

    fn height_group_size(&self, height: u64) -> StoreResult<u32> {
        Ok(self.height_groups.get(&height).copied().unwrap_or(0))
    }

    fn edge(&self, from: BlockId, to: BlockId) -> StoreResult<Edge> {
        self.edges.get(&(from, to)).copied().ok_or_else(|| missing(DatabaseStorePrefixes::Edges, [from.to_be_bytes(), to.to_be_bytes()].concat()))
    }

    fn store_identity(&self) -> StoreResult<StoreIdentity> {
        self.identity.clone().ok_or_else(|| missing(DatabaseStorePrefixes::StoreIdentity, []))
    }
}

impl GraphStore for MemoryGraphStore {
    fn insert_block(&mut self, block: NewBlock) -> StoreResult<BlockId> {
        if self.block_ids.contains_key(&block.hash) {
            return Err(StoreError::HashAlreadyExists(block.hash));
        }
        let id = self.next_block_id;
        self.next_block_id += 1;
        self.block_ids.insert(block.hash, id);
        self.blocks.insert(id, Block::new(id, block));
        Ok(id)
    }

    fn insert_or_update_height_group(&mut self, height: u64, size: u32) -> StoreResult<()> {
        self.height_groups.insert(height, size);
        Ok(())
    }

    fn insert_edge(&mut self, edge: Edge) -> StoreResult<()> {
        let key = (edge.from_block_id, edge.to_block_id);
        if self.edges.contains_key(&key) {
            return Err(StoreError::KeyAlreadyExists(format!("edge {} -> {}", key.0, key.1)));
        }
        self.edges.insert(key, edge);
        Ok(())
    }

    fn update_selected_parent(&mut self, id: BlockId, selected_parent_id: BlockId) -> StoreResult<()> {
        self.block_mut(id)?.selected_parent_id = Some(selected_parent_id);
        Ok(())
    }

    fn update_merge_set_classification(&mut self, id: BlockId, blue_ids: Vec<BlockId>, red_ids: Vec<BlockId>) -> StoreResult<()> {
        let block = self.block_mut(id)?;
        block.merge_set_blue_ids = blue_ids;
        block.merge_set_red_ids = red_ids;
        Ok(())
    }

    fn apply_chain_membership(&mut self, updates: &ChainMembershipUpdates) -> StoreResult<()> {
        for (id, is_in_selected_chain) in updates.iter() {
            self.block_mut(id)?.is_in_selected_chain = is_in_selected_chain;
        }
        Ok(())
    }

    fn apply_colors(&mut self, updates: &BlockColorUpdates) -> StoreResult<()> {
        for (id, color) in updates.iter() {
            self.block_mut(id)?.color = color;
        }
        Ok(())
    }

    fn set_store_identity(&mut self, identity: &StoreIdentity) -> StoreResult<()> {
        self.identity = Some(identity.clone());
        Ok(())
    }
}
