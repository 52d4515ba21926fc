use crate::{db::DB, errors::StoreError};

use super::prelude::{DbKey, DbReader, DbWriter};
use rocksdb::{Direction, IteratorMode, ReadOptions};
use serde::{de::DeserializeOwned, Serialize};
use std::{error::Error, marker::PhantomData};

/// A typed DB store access. Reads and writes go through the reader/writer handed
/// in by the caller, so the same access serves committed reads and open transactions.
pub struct DbAccess<TKey, TData> {
    // DB bucket/path
    prefix: Vec<u8>,
    _phantom: PhantomData<(TKey, TData)>,
}

impl<TKey, TData> Clone for DbAccess<TKey, TData> {
    fn clone(&self) -> Self {
        Self { prefix: self.prefix.clone(), _phantom: PhantomData }
    }
}

pub type KeyDataResult<TData> = Result<(Box<[u8]>, TData), Box<dyn Error>>;

impl<TKey, TData> DbAccess<TKey, TData>
where
    TKey: AsRef<[u8]>,
{
    pub fn new(prefix: Vec<u8>) -> Self {
        Self { prefix, _phantom: PhantomData }
    }

    pub fn has(&self, reader: &impl DbReader, key: TKey) -> Result<bool, StoreError> {
        Ok(reader.get(DbKey::new(&self.prefix, key))?.is_some())
    }

    pub fn read(&self, reader: &impl DbReader, key: TKey) -> Result<TData, StoreError>
    where
        TData: DeserializeOwned,
    {
        let db_key = DbKey::new(&self.prefix, key);
        if let Some(bytes) = reader.get(&db_key)? {
            let data: TData = bincode::deserialize(&bytes)?;
            Ok(data)
        } else {
            Err(StoreError::KeyNotFound(db_key))
        }
    }

    pub fn write(&self, mut writer: impl DbWriter, key: TKey, data: &TData) -> Result<(), StoreError>
    where
        TData: Serialize,
    {
        let bin_data = bincode::serialize(data)?;
        writer.put(DbKey::new(&self.prefix, key), bin_data)?;
        Ok(())
    }

    /// Iterates the committed entries under `self.prefix + bucket`. Returned keys have the
    /// prefix and bucket stripped.
    pub fn bucket_iterator<'a>(&self, db: &'a DB, bucket: &[u8]) -> impl Iterator<Item = KeyDataResult<TData>> + 'a
    where
        TKey: 'a,
        TData: DeserializeOwned + 'a,
    {
        let mut db_key = DbKey::prefix_only(&self.prefix);
        db_key.add_bucket(bucket);

        let mut read_opts = ReadOptions::default();
        read_opts.set_iterate_range(rocksdb::PrefixRange(db_key.as_ref()));

        db.iterator_opt(IteratorMode::From(db_key.as_ref(), Direction::Forward), read_opts).map(move |item| match item {
            Ok((key_bytes, value_bytes)) => match bincode::deserialize::<TData>(value_bytes.as_ref()) {
                Ok(value) => Ok((key_bytes[db_key.prefix_len()..].into(), value)),
                Err(err) => Err(err.into()),
            },
            Err(err) => Err(err.into()),
        })
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_temp_db, prelude::ConnBuilder, prelude::TransactionalDb};

    fn entry_key(bucket: u64, item: u64) -> [u8; 16] {
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&bucket.to_be_bytes());
        key[8..].copy_from_slice(&item.to_be_bytes());
        key
    }

    #[test]
    fn test_read_write_through_transaction() {
        let (_lifetime, db) = create_temp_db!(ConnBuilder::default().with_files_limit(10));
        let db = TransactionalDb::new(db);
        let access = DbAccess::<[u8; 8], u64>::new(vec![1]);

        let mut txn = db.begin();
        access.write(&mut txn, 5u64.to_be_bytes(), &55).unwrap();
        // Staged writes are visible to the transaction but not to committed readers
        assert_eq!(access.read(&txn, 5u64.to_be_bytes()).unwrap(), 55);
        assert!(!access.has(db.db(), 5u64.to_be_bytes()).unwrap());
        txn.commit().unwrap();

        assert_eq!(access.read(db.db(), 5u64.to_be_bytes()).unwrap(), 55);
        assert!(matches!(access.read(db.db(), 6u64.to_be_bytes()), Err(StoreError::KeyNotFound(_))));
    }

    #[test]
    fn test_bucket_iterator() {
        let (_lifetime, db) = create_temp_db!(ConnBuilder::default().with_files_limit(10));
        let db = TransactionalDb::new(db);
        let access = DbAccess::<[u8; 16], u64>::new(vec![3]);

        let mut txn = db.begin();
        for (key, value) in [(entry_key(1, 1), 10u64), (entry_key(1, 2), 20), (entry_key(2, 1), 30)] {
            access.write(&mut txn, key, &value).unwrap();
        }
        txn.commit().unwrap();

        let bucket: Vec<(Box<[u8]>, u64)> = access.bucket_iterator(db.db(), &1u64.to_be_bytes()).map(|r| r.unwrap()).collect();
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket[0].0.as_ref(), &1u64.to_be_bytes());
        assert_eq!(bucket[0].1, 10);
        assert_eq!(bucket[1].0.as_ref(), &2u64.to_be_bytes());
        assert_eq!(bucket[1].1, 20);
        assert_eq!(access.bucket_iterator(db.db(), &3u64.to_be_bytes()).count(), 0);
    }
}
