use crate::{
    config::Config,
    consensus::DynConsensusDataSource,
    errors::{ProcessingError, ProcessingResult},
    events::{AcceptedBlock, GraphEvent, KnownBlock},
    ingestion::{IngestionGate, IngestionOutcome},
    model::StoreIdentity,
    reconciler::ChainReconciler,
    stores::{GraphDatabase, GraphStore, GraphStoreReader},
};
use kgi_core::{info, log::Logger, trace, warn};
use kgi_database::prelude::StoreResultExt;
use std::sync::Arc;

/// Bumped whenever the layout of stored rows changes
pub const PROCESSING_VERSION: u32 = 1;

/// Entry point for the consensus engine's block events. Each event is handled in its own
/// store transaction.
pub struct GraphProcessor {
    database: Arc<GraphDatabase>,
    gate: IngestionGate,
    reconciler: ChainReconciler,
    log: Logger,
}

impl GraphProcessor {
    /// Binds the processor to `database`, verifying the store identity and inserting the
    /// configured genesis block if the store is new.
    pub fn new(database: Arc<GraphDatabase>, consensus: DynConsensusDataSource, config: &Config, log: Logger) -> ProcessingResult<Self> {
        let processor = Self {
            database,
            gate: IngestionGate::new(config.genesis.hash, log.with_target("kgi_processing::ingestion")),
            reconciler: ChainReconciler::new(consensus, log.with_target("kgi_processing::reconciler")),
            log,
        };
        processor.check_identity(StoreIdentity::new(config.network.clone(), PROCESSING_VERSION))?;
        processor.insert_genesis_if_required(&KnownBlock::new(config.genesis.hash, vec![], config.genesis.timestamp))?;
        Ok(processor)
    }

    fn check_identity(&self, configured: StoreIdentity) -> ProcessingResult<()> {
        self.database.run_in_transaction(|txn| match txn.store_identity().optional()? {
            Some(stored) if stored != configured => Err(ProcessingError::IdentityMismatch { stored, configured }),
            Some(_) => Ok(()),
            None => {
                trace!(self.log, "Initializing a new graph store for {}", configured);
                Ok(txn.set_store_identity(&configured)?)
            }
        })
    }

    fn insert_genesis_if_required(&self, genesis: &KnownBlock) -> ProcessingResult<()> {
        let outcome = self.database.run_in_transaction(|txn| {
            if txn.block_exists(genesis.hash)? {
                return Ok(None);
            }
            self.gate.ingest(txn, genesis).map(Some)
        })?;
        if outcome.is_some() {
            info!(self.log, "Inserted genesis block {}", genesis.hash);
        }
        Ok(())
    }

    /// Handles a "block known" event
    pub fn on_block_known(&self, block: &KnownBlock) -> ProcessingResult<IngestionOutcome> {
        self.database.run_in_transaction(|txn| self.gate.ingest(txn, block)).inspect_err(|err| {
            warn!(self.log, "Rejected known block {}: {}", block.hash, err);
        })
    }

    /// Handles a "block accepted" event
    pub fn on_block_accepted(&self, block: &AcceptedBlock) -> ProcessingResult<()> {
        self.database.run_in_transaction(|txn| self.reconciler.reconcile(txn, block)).inspect_err(|err| {
            warn!(self.log, "Rejected accepted block {}: {}", block.hash, err);
        })
    }

    pub fn handle(&self, event: &GraphEvent) -> ProcessingResult<()> {
        match event {
            GraphEvent::BlockKnown(block) => self.on_block_known(block).map(|_| ()),
            GraphEvent::BlockAccepted(block) => self.on_block_accepted(block),
        }
    }

    pub fn database(&self) -> &Arc<GraphDatabase> {
        &self.database
    }
}
