use std::fmt::{Debug, Display};

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DbKey {
    path: Vec<u8>,
    prefix_len: usize,
}

impl DbKey {
    pub fn new<TKey>(prefix: &[u8], key: TKey) -> Self
    where
        TKey: AsRef<[u8]>,
    {
        Self { path: prefix.iter().chain(key.as_ref().iter()).copied().collect(), prefix_len: prefix.len() }
    }

    pub fn prefix_only(prefix: &[u8]) -> Self {
        Self::new(prefix, [])
    }

    /// add a bucket to the DBkey, this adds to the prefix length
    pub fn add_bucket<TBucket>(&mut self, bucket: TBucket)
    where
        TBucket: AsRef<[u8]>,
    {
        self.path.extend(bucket.as_ref().iter());
        self.prefix_len += bucket.as_ref().len();
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }
}

impl AsRef<[u8]> for DbKey {
    fn as_ref(&self) -> &[u8] {
        &self.path
    }
}

impl Display for DbKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use crate::registry::DatabaseStorePrefixes;
        use num_traits::FromPrimitive;

        let (prefix, key) = self.path.split_at(self.prefix_len);
        if let Some((first, rest)) = prefix.split_first() {
            match DatabaseStorePrefixes::from_u8(*first) {
                Some(store) => write!(f, "{store:?}")?,
                None => f.write_str(&faster_hex::hex_string(&[*first]))?,
            }
            if !rest.is_empty() {
                f.write_str("/")?;
                f.write_str(&faster_hex::hex_string(rest))?;
            }
        }
        f.write_str("/")?;
        f.write_str(&faster_hex::hex_string(key))
    }
}

impl Debug for DbKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self, f)
    }
}
