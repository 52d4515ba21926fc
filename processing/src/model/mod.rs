mod block;
mod chain;
mod edge;
mod identity;

pub use block::{Block, BlockColor, BlockId, NewBlock};
pub use chain::{BlockClassification, BlockColorUpdates, ChainMembershipUpdates, SelectedChainChanges};
pub use edge::Edge;
pub use identity::StoreIdentity;
