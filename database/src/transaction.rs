use crate::{db::DB, errors::StoreResult};

use super::prelude::{DbReader, DbWriter};
use parking_lot::{Mutex, MutexGuard};
use rocksdb::WriteBatch;
use std::{collections::HashMap, sync::Arc};

/// A DB handle which hands out atomic, mutually exclusive store transactions.
///
/// Writers are serialized on an internal lock which each [`StoreTransaction`] holds for its
/// whole lifetime, so a transaction observes a stable snapshot of committed state plus its
/// own staged writes. Readers which do not need isolation use [`TransactionalDb::db`] directly
/// and only ever observe fully committed batches.
pub struct TransactionalDb {
    db: Arc<DB>,
    write_lock: Mutex<()>,
}

impl TransactionalDb {
    pub fn new(db: Arc<DB>) -> Self {
        Self { db, write_lock: Mutex::new(()) }
    }

    /// Opens a new transaction, blocking until any in-flight transaction completes
    pub fn begin(&self) -> StoreTransaction<'_> {
        let guard = self.write_lock.lock();
        StoreTransaction { db: &self.db, batch: WriteBatch::default(), staged: HashMap::new(), _guard: guard }
    }

    pub fn db(&self) -> &DB {
        &self.db
    }
}

/// A unit of work over the DB. Writes are staged into a [`WriteBatch`] and become visible to
/// other readers only on [`StoreTransaction::commit`]. Dropping the transaction without committing
/// discards every staged write.
pub struct StoreTransaction<'a> {
    db: &'a DB,
    batch: WriteBatch,
    // Read-your-writes overlay. `None` marks a staged delete
    staged: HashMap<Vec<u8>, Option<Vec<u8>>>,
    _guard: MutexGuard<'a, ()>,
}

impl StoreTransaction<'_> {
    /// Atomically applies all staged writes
    pub fn commit(self) -> StoreResult<()> {
        self.db.write(self.batch)?;
        Ok(())
    }
}

impl DbReader for StoreTransaction<'_> {
    fn get<K: AsRef<[u8]>>(&self, key: K) -> StoreResult<Option<Vec<u8>>> {
        if let Some(staged) = self.staged.get(key.as_ref()) {
            return Ok(staged.clone());
        }
        DbReader::get(self.db, key)
    }
}

impl DbWriter for StoreTransaction<'_> {
    fn put<K, V>(&mut self, key: K, value: V) -> Result<(), rocksdb::Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        self.batch.put(key.as_ref(), value.as_ref());
        self.staged.insert(key.as_ref().to_vec(), Some(value.as_ref().to_vec()));
        Ok(())
    }

    fn delete<K: AsRef<[u8]>>(&mut self, key: K) -> Result<(), rocksdb::Error> {
        self.batch.delete(key.as_ref());
        self.staged.insert(key.as_ref().to_vec(), None);
        Ok(())
    }
}
