use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifies what a graph store was built for. Written once when the store is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreIdentity {
    pub network: String,
    pub processing_version: u32,
}

impl StoreIdentity {
    pub fn new(network: impl Into<String>, processing_version: u32) -> Self {
        Self { network: network.into(), processing_version }
    }
}

impl Display for StoreIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (processing version {})", self.network, self.processing_version)
    }
}
