mod access;
mod db;
mod errors;
mod item;
mod key;
mod transaction;
mod writer;

pub mod registry;
pub mod utils;

pub mod prelude {
    use crate::{db, errors};

    pub use super::access::{DbAccess, KeyDataResult};
    pub use super::item::DbItem;
    pub use super::key::DbKey;
    pub use super::transaction::{StoreTransaction, TransactionalDb};
    pub use super::writer::{DbReader, DbWriter};
    pub use db::{ConnBuilder, DB};
    pub use errors::{StoreError, StoreResult, StoreResultExt};
}
