use super::{FIRST_BLOCK_ID, GraphStore, GraphStoreReader};
use crate::{
    config::Config,
    errors::{ProcessingError, ProcessingResult},
    model::{Block, BlockColorUpdates, BlockId, ChainMembershipUpdates, Edge, NewBlock, StoreIdentity},
};
use kaspa_hashes::Hash;
use kgi_database::{
    prelude::{ConnBuilder, DB, DbAccess, DbItem, DbKey, DbReader, StoreError, StoreResult, StoreResultExt, StoreTransaction, TransactionalDb},
    registry::DatabaseStorePrefixes,
};
use std::sync::Arc;

type BlockIdKey = [u8; 8];
type HashKey = [u8; 32];
type HeightKey = [u8; 8];
type EdgeKey = [u8; 16];

fn edge_key(from: BlockId, to: BlockId) -> EdgeKey {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&from.to_be_bytes());
    key[8..].copy_from_slice(&to.to_be_bytes());
    key
}

/// The typed stores making up the graph
#[derive(Clone)]
pub struct GraphStores {
    blocks: DbAccess<BlockIdKey, Block>,
    block_ids: DbAccess<HashKey, BlockId>,
    edges: DbAccess<EdgeKey, Edge>,
    height_groups: DbAccess<HeightKey, u32>,
    next_block_id: DbItem<BlockId>,
    identity: DbItem<StoreIdentity>,
}

impl Default for GraphStores {
    fn default() -> Self {
        Self {
            blocks: DbAccess::new(DatabaseStorePrefixes::Blocks.into()),
            block_ids: DbAccess::new(DatabaseStorePrefixes::BlockIdsByHash.into()),
            edges: DbAccess::new(DatabaseStorePrefixes::Edges.into()),
            height_groups: DbAccess::new(DatabaseStorePrefixes::HeightGroups.into()),
            next_block_id: DbItem::new(DatabaseStorePrefixes::NextBlockId.into()),
            identity: DbItem::new(DatabaseStorePrefixes::StoreIdentity.into()),
        }
    }
}

/// The graph stores bound to a DB reader. With a committed DB handle this is a plain reader,
/// with a [`StoreTransaction`] it is a full [`GraphStore`].
pub struct DbGraphStore<'a, R> {
    stores: &'a GraphStores,
    access: R,
}

/// The graph stores bound to an open transaction
pub type GraphTransaction<'a> = DbGraphStore<'a, StoreTransaction<'a>>;

impl<'a, R: DbReader> DbGraphStore<'a, R> {
    pub fn new(stores: &'a GraphStores, access: R) -> Self {
        Self { stores, access }
    }
}

impl<R: DbReader> GraphStoreReader for DbGraphStore<'_, R> {
    fn block_exists(&self, hash: Hash) -> StoreResult<bool> {
        self.stores.block_ids.has(&self.access, hash.as_bytes())
    }

    fn block_id_by_hash(&self, hash: Hash) -> StoreResult<BlockId> {
        match self.stores.block_ids.read(&self.access, hash.as_bytes()) {
            Err(StoreError::KeyNotFound(_)) => Err(StoreError::HashNotFound(hash)),
            res => res,
        }
    }

    fn block(&self, id: BlockId) -> StoreResult<Block> {
        self.stores.blocks.read(&self.access, id.to_be_bytes())
    }

    fn height_group_size(&self, height: u64) -> StoreResult<u32> {
        Ok(self.stores.height_groups.read(&self.access, height.to_be_bytes()).optional()?.unwrap_or(0))
    }

    fn edge(&self, from: BlockId, to: BlockId) -> StoreResult<Edge> {
        self.stores.edges.read(&self.access, edge_key(from, to))
    }

    fn store_identity(&self) -> StoreResult<StoreIdentity> {
        self.stores.identity.read(&self.access)
    }
}

impl GraphTransaction<'_> {
    fn update_block(&mut self, id: BlockId, op: impl FnOnce(&mut Block)) -> StoreResult<()> {
        let mut block = self.block(id)?;
        op(&mut block);
        self.stores.blocks.write(&mut self.access, id.to_be_bytes(), &block)
    }
}

impl GraphStore for GraphTransaction<'_> {
    fn insert_block(&mut self, block: NewBlock) -> StoreResult<BlockId> {
        if self.block_exists(block.hash)? {
            return Err(StoreError::HashAlreadyExists(block.hash));
        }
        // The counter holds the next free id
        let id = self.stores.next_block_id.update(&mut self.access, FIRST_BLOCK_ID, |next| next + 1)? - 1;
        let hash = block.hash;
        self.stores.blocks.write(&mut self.access, id.to_be_bytes(), &Block::new(id, block))?;
        self.stores.block_ids.write(&mut self.access, hash.as_bytes(), &id)?;
        Ok(id)
    }

    fn insert_or_update_height_group(&mut self, height: u64, size: u32) -> StoreResult<()> {
        self.stores.height_groups.write(&mut self.access, height.to_be_bytes(), &size)
    }

    fn insert_edge(&mut self, edge: Edge) -> StoreResult<()> {
        let key = edge_key(edge.from_block_id, edge.to_block_id);
        if self.stores.edges.has(&self.access, key)? {
            return Err(StoreError::KeyAlreadyExists(DbKey::new(self.stores.edges.prefix(), key).to_string()));
        }
        self.stores.edges.write(&mut self.access, key, &edge)
    }

    fn update_selected_parent(&mut self, id: BlockId, selected_parent_id: BlockId) -> StoreResult<()> {
        self.update_block(id, |block| block.selected_parent_id = Some(selected_parent_id))
    }

    fn update_merge_set_classification(&mut self, id: BlockId, blue_ids: Vec<BlockId>, red_ids: Vec<BlockId>) -> StoreResult<()> {
        self.update_block(id, |block| {
            block.merge_set_blue_ids = blue_ids;
            block.merge_set_red_ids = red_ids;
        })
    }

    fn apply_chain_membership(&mut self, updates: &ChainMembershipUpdates) -> StoreResult<()> {
        for (id, is_in_selected_chain) in updates.iter() {
            self.update_block(id, |block| block.is_in_selected_chain = is_in_selected_chain)?;
        }
        Ok(())
    }

    fn apply_colors(&mut self, updates: &BlockColorUpdates) -> StoreResult<()> {
        for (id, color) in updates.iter() {
            self.update_block(id, |block| block.color = color)?;
        }
        Ok(())
    }

    fn set_store_identity(&mut self, identity: &StoreIdentity) -> StoreResult<()> {
        self.stores.identity.write(&mut self.access, identity)
    }
}

/// The RocksDB backed graph. All updates run through [`GraphDatabase::run_in_transaction`];
/// the read accessors only ever observe committed transactions.
pub struct GraphDatabase {
    db: TransactionalDb,
    stores: GraphStores,
}

impl GraphDatabase {
    pub fn new(db: Arc<DB>) -> Self {
        Self { db: TransactionalDb::new(db), stores: GraphStores::default() }
    }

    /// Opens (or creates) the graph database under the configured app directory
    pub fn open(config: &Config) -> ProcessingResult<Self> {
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir).map_err(|err| ProcessingError::Config(format!("cannot create {}: {err}", db_dir.display())))?;
        let db = ConnBuilder::default()
            .with_db_path(db_dir)
            .with_parallelism(config.db.parallelism)
            .with_mem_budget(config.db.mem_budget)
            .with_files_limit(config.db.files_limit)
            .build()
            .map_err(ProcessingError::Database)?;
        Ok(Self::new(db))
    }

    /// Runs `op` inside a single store transaction. Its writes are committed atomically if it
    /// returns `Ok` and discarded otherwise. Transactions are mutually exclusive.
    pub fn run_in_transaction<T, F>(&self, op: F) -> ProcessingResult<T>
    where
        F: FnOnce(&mut GraphTransaction<'_>) -> ProcessingResult<T>,
    {
        let mut txn = DbGraphStore::new(&self.stores, self.db.begin());
        let value = op(&mut txn)?;
        txn.access.commit().map_err(ProcessingError::TransactionFailure)?;
        Ok(value)
    }

    /// A reader over committed state
    pub fn reader(&self) -> DbGraphStore<'_, &DB> {
        DbGraphStore::new(&self.stores, self.db.db())
    }

    pub fn block_by_hash(&self, hash: Hash) -> StoreResult<Option<Block>> {
        let reader = self.reader();
        match reader.block_id_by_hash(hash).optional()? {
            Some(id) => Ok(Some(reader.block(id)?)),
            None => Ok(None),
        }
    }

    pub fn block_by_id(&self, id: BlockId) -> StoreResult<Option<Block>> {
        self.reader().block(id).optional()
    }

    /// All edges from `id` to its parents, ordered by parent id
    pub fn edges_from(&self, id: BlockId) -> StoreResult<Vec<Edge>> {
        self.stores
            .edges
            .bucket_iterator(self.db.db(), &id.to_be_bytes())
            .map(|res| res.map(|(_, edge)| edge).map_err(|err| StoreError::DataInconsistency(err.to_string())))
            .collect()
    }

    pub fn height_group_size(&self, height: u64) -> StoreResult<u32> {
        self.reader().height_group_size(height)
    }

    pub fn store_identity(&self) -> StoreResult<Option<StoreIdentity>> {
        self.reader().store_identity().optional()
    }
}
