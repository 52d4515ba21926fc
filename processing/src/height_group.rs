//! Per-height layout bookkeeping. Each height keeps a count of the blocks placed on it, and a
//! new block takes the current count as its position.
//!
//! Both functions run against the caller's store. When that store is a transaction, the claim
//! is serialized by the transaction's isolation together with the block insert.

use crate::stores::{GraphStore, GraphStoreReader};
use kgi_database::prelude::StoreResult;

/// The number of blocks currently at `height`
pub fn peek_size(store: &impl GraphStoreReader, height: u64) -> StoreResult<u32> {
    store.height_group_size(height)
}

/// Returns the next free position at `height` and grows the group by one
pub fn claim_next_index(store: &mut impl GraphStore, height: u64) -> StoreResult<u32> {
    let index = store.height_group_size(height)?;
    store.insert_or_update_height_group(height, index + 1)?;
    Ok(index)
}
