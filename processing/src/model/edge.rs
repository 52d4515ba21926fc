use super::BlockId;
use serde::{Deserialize, Serialize};

/// A child to parent link. The height and height-group index of both endpoints are captured
/// when the edge is created and never refreshed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from_block_id: BlockId,
    pub to_block_id: BlockId,
    pub from_height: u64,
    pub to_height: u64,
    pub from_height_group_index: u32,
    pub to_height_group_index: u32,
}
