use kaspa_hashes::Hash;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Surrogate block identifier, assigned once at first insertion
pub type BlockId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockColor {
    #[default]
    Gray,
    Blue,
    Red,
}

impl Display for BlockColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BlockColor::Gray => "gray",
            BlockColor::Blue => "blue",
            BlockColor::Red => "red",
        };
        f.write_str(s)
    }
}

/// A materialized block row.
///
/// `height`, `height_group_index` and `parent_ids` are fixed at insertion. Only
/// `selected_parent_id`, the merge set classification, `color` and `is_in_selected_chain`
/// are updated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub hash: Hash,
    pub timestamp: i64,
    pub parent_ids: Vec<BlockId>,
    pub height: u64,
    pub height_group_index: u32,
    pub selected_parent_id: Option<BlockId>,
    pub merge_set_blue_ids: Vec<BlockId>,
    pub merge_set_red_ids: Vec<BlockId>,
    pub color: BlockColor,
    pub is_in_selected_chain: bool,
}

impl Block {
    pub fn new(id: BlockId, block: NewBlock) -> Self {
        Self {
            id,
            hash: block.hash,
            timestamp: block.timestamp,
            parent_ids: block.parent_ids,
            height: block.height,
            height_group_index: block.height_group_index,
            selected_parent_id: None,
            merge_set_blue_ids: Vec::new(),
            merge_set_red_ids: Vec::new(),
            color: BlockColor::Gray,
            is_in_selected_chain: block.is_in_selected_chain,
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// Whether the block's own selected parent and merge set were already recorded.
    ///
    /// `ChainReconciler::reconcile` writes the selected parent and both merge set lists in the
    /// same step, and nothing else writes either, so the selected parent alone decides.
    pub fn is_classified(&self) -> bool {
        self.selected_parent_id.is_some()
    }
}

/// A block row before the store assigns it an id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBlock {
    pub hash: Hash,
    pub timestamp: i64,
    pub parent_ids: Vec<BlockId>,
    pub height: u64,
    pub height_group_index: u32,
    pub is_in_selected_chain: bool,
}
