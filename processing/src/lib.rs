pub mod config;
pub mod consensus;
pub mod errors;
pub mod events;
pub mod height_group;
pub mod ingestion;
pub mod model;
pub mod processor;
pub mod reconciler;
pub mod stores;
pub mod test_helpers;
