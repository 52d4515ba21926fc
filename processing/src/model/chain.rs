use super::{BlockColor, BlockId};
use indexmap::IndexMap;
use kaspa_hashes::Hash;

/// The consensus engine's classification of a block: its selected parent and the blue/red
/// partition of its merge set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockClassification {
    pub selected_parent: Hash,
    pub mergeset_blues: Vec<Hash>,
    pub mergeset_reds: Vec<Hash>,
}

impl BlockClassification {
    pub fn new(selected_parent: Hash, mergeset_blues: Vec<Hash>, mergeset_reds: Vec<Hash>) -> Self {
        Self { selected_parent, mergeset_blues, mergeset_reds }
    }
}

/// A selected chain delta. Both sequences keep the order the consensus engine reported them in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectedChainChanges {
    pub removed: Vec<Hash>,
    pub added: Vec<Hash>,
}

impl SelectedChainChanges {
    pub fn new(removed: Vec<Hash>, added: Vec<Hash>) -> Self {
        Self { removed, added }
    }

    /// Returns the first removed hash which is also listed as added, if any
    pub fn first_overlap(&self) -> Option<Hash> {
        self.removed.iter().copied().find(|hash| self.added.contains(hash))
    }
}

/// Pending selected chain membership changes, keyed by block id.
/// Setting an id twice keeps its first position and the last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainMembershipUpdates(IndexMap<BlockId, bool>);

impl ChainMembershipUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: BlockId, is_in_selected_chain: bool) {
        self.0.insert(id, is_in_selected_chain);
    }

    pub fn get(&self, id: BlockId) -> Option<bool> {
        self.0.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, bool)> + '_ {
        self.0.iter().map(|(&id, &flag)| (id, flag))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pending color changes, keyed by block id. Same override rule as [`ChainMembershipUpdates`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockColorUpdates(IndexMap<BlockId, BlockColor>);

impl BlockColorUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: BlockId, color: BlockColor) {
        self.0.insert(id, color);
    }

    pub fn set_many(&mut self, ids: &[BlockId], color: BlockColor) {
        ids.iter().for_each(|&id| self.set(id, color));
    }

    pub fn get(&self, id: BlockId) -> Option<BlockColor> {
        self.0.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, BlockColor)> + '_ {
        self.0.iter().map(|(&id, &color)| (id, color))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_updates_override() {
        let mut colors = BlockColorUpdates::new();
        colors.set(3, BlockColor::Gray);
        colors.set(5, BlockColor::Red);
        colors.set_many(&[3, 7], BlockColor::Blue);
        assert_eq!(colors.iter().collect::<Vec<_>>(), vec![(3, BlockColor::Blue), (5, BlockColor::Red), (7, BlockColor::Blue)]);

        let mut membership = ChainMembershipUpdates::new();
        membership.set(3, false);
        membership.set(3, true);
        assert_eq!(membership.len(), 1);
        assert_eq!(membership.get(3), Some(true));
        assert_eq!(membership.get(4), None);
    }

    #[test]
    fn test_first_overlap() {
        let changes = SelectedChainChanges::new(vec![1.into(), 2.into()], vec![3.into()]);
        assert_eq!(changes.first_overlap(), None);
        let changes = SelectedChainChanges::new(vec![1.into(), 2.into()], vec![3.into(), 2.into()]);
        assert_eq!(changes.first_overlap(), Some(2.into()));
    }
}
