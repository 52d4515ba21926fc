use crate::{db::DB, errors::StoreResult};

/// Abstraction over reading committed or staged DB state
pub trait DbReader {
    fn get<K: AsRef<[u8]>>(&self, key: K) -> StoreResult<Option<Vec<u8>>>;
}

/// Abstraction over direct/transactional DB writing
pub trait DbWriter {
    fn put<K, V>(&mut self, key: K, value: V) -> Result<(), rocksdb::Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>;
    fn delete<K: AsRef<[u8]>>(&mut self, key: K) -> Result<(), rocksdb::Error>;
}

impl DbReader for DB {
    fn get<K: AsRef<[u8]>>(&self, key: K) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.get_pinned(key)?.map(|slice| slice.to_vec()))
    }
}

impl<T: DbReader> DbReader for &T {
    #[inline]
    fn get<K: AsRef<[u8]>>(&self, key: K) -> StoreResult<Option<Vec<u8>>> {
        (*self).get(key)
    }
}

impl<T: DbReader> DbReader for &mut T {
    #[inline]
    fn get<K: AsRef<[u8]>>(&self, key: K) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }
}

impl<T: DbWriter> DbWriter for &mut T {
    #[inline]
    fn put<K, V>(&mut self, key: K, value: V) -> Result<(), rocksdb::Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        (*self).put(key, value)
    }

    #[inline]
    fn delete<K: AsRef<[u8]>>(&mut self, key: K) -> Result<(), rocksdb::Error> {
        (*self).delete(key)
    }
}
