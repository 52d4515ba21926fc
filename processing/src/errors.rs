use crate::model::StoreIdentity;
use kaspa_hashes::Hash;
use kgi_database::prelude::StoreError;
use thiserror::Error;

/// Errors terminating a single graph update. Nothing of the update is committed when one is returned.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("block {block} references parent {parent} which is not known yet")]
    MissingParent { block: Hash, parent: Hash },

    #[error("block {0} has no parents but is not the configured genesis")]
    UnexpectedRoot(Hash),

    #[error("block {0} is not known")]
    NotFound(Hash),

    #[error("merge set or selected chain changes reference unknown block {0}")]
    InvalidDiff(Hash),

    #[error("block {0} is listed as both removed from and added to the selected chain")]
    BlockInBothRemovedAndAdded(Hash),

    #[error("no consensus classification is available for block {0}")]
    ConsensusData(Hash),

    #[error("store was created for {stored} but is opened as {configured}")]
    IdentityMismatch { stored: StoreIdentity, configured: StoreIdentity },

    #[error("transaction failure: {0}")]
    TransactionFailure(#[from] StoreError),

    #[error("database error: {0}")]
    Database(StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ProcessingResult<T> = std::result::Result<T, ProcessingError>;
