use crate::{
    consensus::DynConsensusDataSource,
    errors::{ProcessingError, ProcessingResult},
    events::AcceptedBlock,
    model::{BlockColor, BlockColorUpdates, BlockId, ChainMembershipUpdates, SelectedChainChanges},
    stores::GraphStore,
};
use kaspa_hashes::Hash;
use kgi_core::{debug, log::Logger, trace};
use kgi_database::prelude::StoreError;

/// Records consensus decisions for accepted blocks and keeps selected chain membership and
/// block colors in line with the selected chain changes reported alongside them.
pub struct ChainReconciler {
    consensus: DynConsensusDataSource,
    log: Logger,
}

impl ChainReconciler {
    pub fn new(consensus: DynConsensusDataSource, log: Logger) -> Self {
        Self { consensus, log }
    }

    /// Reconciles `block` into `store`. As with ingestion, the store is expected to be a single
    /// transaction which the caller discards on error.
    pub fn reconcile(&self, store: &mut impl GraphStore, block: &AcceptedBlock) -> ProcessingResult<()> {
        debug!(self.log, "Processing added block {}", block.hash);
        let res = self.reconcile_inner(store, block);
        debug!(self.log, "Finished processing added block {}", block.hash);
        res
    }

    fn reconcile_inner(&self, store: &mut impl GraphStore, block: &AcceptedBlock) -> ProcessingResult<()> {
        if let Some(hash) = block.chain_changes.as_ref().and_then(SelectedChainChanges::first_overlap) {
            return Err(ProcessingError::BlockInBothRemovedAndAdded(hash));
        }

        let id = store.block_id_by_hash(block.hash).map_err(|err| match err {
            StoreError::HashNotFound(hash) => ProcessingError::NotFound(hash),
            err => err.into(),
        })?;

        // Everything is resolved before the first write
        let classification = &block.classification;
        let selected_parent_id = store.block_id_by_hash(classification.selected_parent).map_err(invalid_diff)?;
        let blue_ids = resolve(store, &classification.mergeset_blues)?;
        let red_ids = resolve(store, &classification.mergeset_reds)?;
        let chain_updates = match &block.chain_changes {
            Some(chain_changes) => Some(self.chain_updates(store, block.hash, chain_changes, (blue_ids.as_slice(), red_ids.as_slice()))?),
            None => None,
        };

        trace!(self.log, "Block {} merges {} blue and {} red blocks", block.hash, blue_ids.len(), red_ids.len());
        store.update_selected_parent(id, selected_parent_id)?;
        store.update_merge_set_classification(id, blue_ids, red_ids)?;

        let Some((membership, colors)) = chain_updates else {
            trace!(self.log, "Block {} carries no selected chain changes", block.hash);
            return Ok(());
        };
        trace!(
            self.log,
            "Applying {} chain membership and {} color updates for block {}",
            membership.len(),
            colors.len(),
            block.hash
        );
        store.apply_chain_membership(&membership)?;
        store.apply_colors(&colors)?;
        Ok(())
    }

    /// Builds the membership and color commands for a selected chain change. Removals are
    /// applied first, then additions, then the merge set colors of each added block in order.
    fn chain_updates(
        &self,
        store: &impl GraphStore,
        accepted_hash: Hash,
        chain_changes: &SelectedChainChanges,
        accepted_merge_set: (&[BlockId], &[BlockId]),
    ) -> ProcessingResult<(ChainMembershipUpdates, BlockColorUpdates)> {
        let mut membership = ChainMembershipUpdates::new();
        let mut colors = BlockColorUpdates::new();

        for removed_id in resolve(store, &chain_changes.removed)? {
            membership.set(removed_id, false);
            colors.set(removed_id, BlockColor::Gray);
        }

        let added_ids = resolve(store, &chain_changes.added)?;
        for &added_id in added_ids.iter() {
            membership.set(added_id, true);
        }

        // Later added blocks override the colors set by earlier ones
        for (&added_hash, &added_id) in chain_changes.added.iter().zip(added_ids.iter()) {
            if added_hash == accepted_hash {
                let (blues, reds) = accepted_merge_set;
                colors.set_many(blues, BlockColor::Blue);
                colors.set_many(reds, BlockColor::Red);
            } else {
                let (blues, reds) = self.merge_set_of(store, added_hash, added_id)?;
                colors.set_many(&blues, BlockColor::Blue);
                colors.set_many(&reds, BlockColor::Red);
            }
        }

        Ok((membership, colors))
    }

    /// The merge set classification recorded for a chain block. Falls back to the consensus
    /// data source for a block which was never reconciled itself.
    fn merge_set_of(&self, store: &impl GraphStore, hash: Hash, id: BlockId) -> ProcessingResult<(Vec<BlockId>, Vec<BlockId>)> {
        let block = store.block(id)?;
        if block.is_classified() {
            return Ok((block.merge_set_blue_ids, block.merge_set_red_ids));
        }
        let classification = self.consensus.get_classification(hash).ok_or(ProcessingError::ConsensusData(hash))?;
        Ok((resolve(store, &classification.mergeset_blues)?, resolve(store, &classification.mergeset_reds)?))
    }
}

fn resolve(store: &impl GraphStore, hashes: &[Hash]) -> ProcessingResult<Vec<BlockId>> {
    store.block_ids_by_hashes(hashes).map_err(invalid_diff)
}

fn invalid_diff(err: StoreError) -> ProcessingError {
    match err {
        StoreError::HashNotFound(hash) => ProcessingError::InvalidDiff(hash),
        err => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        consensus::MemoryConsensusDataSource,
        ingestion::IngestionGate,
        model::Block,
        stores::{GraphStoreReader, MemoryGraphStore},
        test_helpers::{accepted, chain_changes, classification, hash, known, test_logger},
    };
    use std::sync::Arc;

    struct Harness {
        store: MemoryGraphStore,
        gate: IngestionGate,
        reconciler: ChainReconciler,
        consensus: Arc<MemoryConsensusDataSource>,
    }

    impl Harness {
        /// G <- A, G <- B, {A, B} <- C
        fn new() -> Self {
            let (log, _) = test_logger();
            let consensus = Arc::new(MemoryConsensusDataSource::new());
            let mut harness = Self {
                store: MemoryGraphStore::new(),
                gate: IngestionGate::new(hash(0), log.clone()),
                reconciler: ChainReconciler::new(consensus.clone(), log),
                consensus,
            };
            for block in [known(0, &[]), known(1, &[0]), known(2, &[0]), known(3, &[1, 2])] {
                harness.gate.ingest(&mut harness.store, &block).unwrap();
            }
            harness
        }

        fn block(&self, n: u64) -> Block {
            self.store.block(self.store.block_id_by_hash(hash(n)).unwrap()).unwrap()
        }

        fn state(&self, n: u64) -> (BlockColor, bool) {
            let block = self.block(n);
            (block.color, block.is_in_selected_chain)
        }
    }

    #[test]
    fn test_reconcile_with_chain_changes() {
        let mut h = Harness::new();
        let block = accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[1], &[3])));
        h.reconciler.reconcile(&mut h.store, &block).unwrap();

        // A is first grayed out by removal, then colored blue by C's merge set
        assert_eq!(h.state(1), (BlockColor::Blue, false));
        assert_eq!(h.state(2), (BlockColor::Red, false));
        assert_eq!(h.state(3), (BlockColor::Gray, true));
        let c = h.block(3);
        assert_eq!(c.selected_parent_id, Some(h.block(1).id));
        assert_eq!(c.merge_set_blue_ids, vec![h.block(1).id]);
        assert_eq!(c.merge_set_red_ids, vec![h.block(2).id]);
    }

    #[test]
    fn test_reconcile_without_chain_changes() {
        let mut h = Harness::new();
        h.reconciler.reconcile(&mut h.store, &accepted(3, classification(1, &[1], &[2]), None)).unwrap();

        let c = h.block(3);
        assert!(c.is_classified());
        assert_eq!(c.selected_parent_id, Some(h.block(1).id));
        assert_eq!(c.merge_set_blue_ids, vec![h.block(1).id]);
        assert_eq!(c.merge_set_red_ids, vec![h.block(2).id]);
        assert!(!h.block(1).is_classified());
        for n in 1..=3 {
            assert_eq!(h.state(n), (BlockColor::Gray, false));
        }
        // Genesis keeps its initial membership
        assert_eq!(h.state(0), (BlockColor::Gray, true));
    }

    #[test]
    fn test_added_block_classification_comes_from_consensus() {
        let mut h = Harness::new();
        // A was never reconciled here, so its merge set is looked up
        h.consensus.insert(hash(1), classification(0, &[0], &[]));
        let block = accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[], &[1, 3])));
        h.reconciler.reconcile(&mut h.store, &block).unwrap();

        assert_eq!(h.state(0), (BlockColor::Blue, true));
        assert_eq!(h.state(1), (BlockColor::Blue, true));
        assert_eq!(h.state(2), (BlockColor::Red, false));
        assert_eq!(h.state(3), (BlockColor::Gray, true));
    }

    #[test]
    fn test_later_added_block_overrides_color() {
        let mut h = Harness::new();
        h.reconciler.reconcile(&mut h.store, &accepted(1, classification(0, &[0, 2], &[]), None)).unwrap();
        let block = accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[], &[1, 3])));
        h.reconciler.reconcile(&mut h.store, &block).unwrap();
        // B is blue in A's merge set but red in C's, and C comes later
        assert_eq!(h.state(2), (BlockColor::Red, false));
    }

    #[test]
    fn test_missing_consensus_data() {
        let mut h = Harness::new();
        let block = accepted(3, classification(1, &[1], &[2]), Some(chain_changes(&[], &[2, 3])));
        let err = h.reconciler.reconcile(&mut h.store, &block).unwrap_err();
        assert!(matches!(err, ProcessingError::ConsensusData(missing) if missing == hash(2)));
    }

    #[test]
    fn test_rejections() {
        let mut h = Harness::new();

        let err = h.reconciler.reconcile(&mut h.store, &accepted(9, classification(1, &[], &[]), None)).unwrap_err();
        assert!(matches!(err, ProcessingError::NotFound(missing) if missing == hash(9)));

        let err = h.reconciler.reconcile(&mut h.store, &accepted(3, classification(8, &[], &[]), None)).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidDiff(missing) if missing == hash(8)));

        let err = h.reconciler.reconcile(&mut h.store, &accepted(3, classification(1, &[1, 7], &[]), None)).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidDiff(missing) if missing == hash(7)));

        let block = accepted(3, classification(1, &[1], &[]), Some(chain_changes(&[6], &[3])));
        let err = h.reconciler.reconcile(&mut h.store, &block).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidDiff(missing) if missing == hash(6)));

        let block = accepted(3, classification(1, &[1], &[]), Some(chain_changes(&[1], &[3, 1])));
        let err = h.reconciler.reconcile(&mut h.store, &block).unwrap_err();
        assert!(matches!(err, ProcessingError::BlockInBothRemovedAndAdded(both) if both == hash(1)));

        // None of the rejected calls recorded anything
        assert_eq!(h.block(3).selected_parent_id, None);
        assert!(h.block(3).merge_set_blue_ids.is_empty());
    }
}
