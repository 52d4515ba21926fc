use crate::errors::StoreError;

use super::prelude::{DbKey, DbReader, DbWriter};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

/// A single-key DB item
pub struct DbItem<T> {
    key: Vec<u8>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for DbItem<T> {
    fn clone(&self) -> Self {
        Self { key: self.key.clone(), _phantom: PhantomData }
    }
}

impl<T> DbItem<T> {
    pub fn new(key: Vec<u8>) -> Self {
        Self { key, _phantom: PhantomData }
    }

    pub fn read(&self, reader: &impl DbReader) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        if let Some(bytes) = reader.get(&self.key)? {
            let item: T = bincode::deserialize(&bytes)?;
            Ok(item)
        } else {
            Err(StoreError::KeyNotFound(DbKey::prefix_only(&self.key)))
        }
    }

    pub fn write(&self, mut writer: impl DbWriter, item: &T) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let bin_data = bincode::serialize(item)?;
        writer.put(&self.key, bin_data)?;
        Ok(())
    }

    /// Reads the current item (or `default` if absent), applies `op` and writes the result back
    /// through the same access. Returns the updated item.
    pub fn update<A, F>(&self, access: &mut A, default: T, op: F) -> Result<T, StoreError>
    where
        A: DbReader + DbWriter,
        T: Serialize + DeserializeOwned,
        F: FnOnce(T) -> T,
    {
        let item = match access.get(&self.key)? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => default,
        };
        let item = op(item); // Apply the update op
        let bin_data = bincode::serialize(&item)?;
        access.put(&self.key, bin_data)?;
        Ok(item)
    }
}
