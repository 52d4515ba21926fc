use crate::{
    errors::{ProcessingError, ProcessingResult},
    events::KnownBlock,
    height_group,
    model::{BlockId, Edge, NewBlock},
    stores::GraphStore,
};
use itertools::Itertools;
use kaspa_hashes::Hash;
use kgi_core::{debug, log::Logger, trace};
use kgi_database::prelude::{StoreError, StoreResultExt};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestionOutcome {
    /// The hash was already stored. Nothing was written
    AlreadyKnown(BlockId),
    Inserted { id: BlockId, height: u64, height_group_index: u32 },
}

impl IngestionOutcome {
    pub fn id(&self) -> BlockId {
        match *self {
            IngestionOutcome::AlreadyKnown(id) => id,
            IngestionOutcome::Inserted { id, .. } => id,
        }
    }
}

/// Places newly known blocks into the graph: assigns height and height-group index,
/// stores the block row and links it to its parents.
pub struct IngestionGate {
    genesis: Hash,
    log: Logger,
}

impl IngestionGate {
    pub fn new(genesis: Hash, log: Logger) -> Self {
        Self { genesis, log }
    }

    /// Ingests `block` into `store`. The store is expected to be a single transaction: on error
    /// the caller discards it, so a block is either fully recorded or not at all.
    pub fn ingest(&self, store: &mut impl GraphStore, block: &KnownBlock) -> ProcessingResult<IngestionOutcome> {
        debug!(self.log, "Preprocessing block {}", block.hash);
        let outcome = self.ingest_inner(store, block);
        debug!(self.log, "Finished preprocessing block {}", block.hash);
        outcome
    }

    fn ingest_inner(&self, store: &mut impl GraphStore, block: &KnownBlock) -> ProcessingResult<IngestionOutcome> {
        if let Some(id) = store.block_id_by_hash(block.hash).optional()? {
            trace!(self.log, "Block {} already exists as id {}. Skipping", block.hash, id);
            return Ok(IngestionOutcome::AlreadyKnown(id));
        }

        let is_genesis = block.hash == self.genesis;
        let parents = block.parents.iter().copied().unique().collect_vec();
        if parents.is_empty() && !is_genesis {
            return Err(ProcessingError::UnexpectedRoot(block.hash));
        }
        let parent_ids = store.block_ids_by_hashes(&parents).map_err(|err| match err {
            StoreError::HashNotFound(parent) => ProcessingError::MissingParent { block: block.hash, parent },
            err => err.into(),
        })?;

        // Only the genesis is parentless and sits at height 0
        let max_parent_height = parent_ids.iter().map(|&id| store.height_of(id)).process_results(|heights| heights.max())?;
        let height = max_parent_height.map_or(0, |h| h + 1);
        let height_group_index = height_group::claim_next_index(store, height)?;
        trace!(self.log, "Block {} placed at height {} index {}", block.hash, height, height_group_index);

        let id = store.insert_block(NewBlock {
            hash: block.hash,
            timestamp: block.timestamp,
            parent_ids: parent_ids.clone(),
            height,
            height_group_index,
            is_in_selected_chain: is_genesis,
        })?;

        for parent_id in parent_ids {
            let edge = Edge {
                from_block_id: id,
                to_block_id: parent_id,
                from_height: height,
                to_height: store.height_of(parent_id)?,
                from_height_group_index: height_group_index,
                to_height_group_index: store.height_group_index_of(parent_id)?,
            };
            store.insert_edge(edge)?;
        }
        trace!(self.log, "Block {} inserted as id {} with {} parent edges", block.hash, id, parents.len());

        Ok(IngestionOutcome::Inserted { id, height, height_group_index })
    }
}
