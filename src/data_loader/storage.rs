use std::hash::Hash;

/// Cache storage for a [`DataLoader`](super::DataLoader).
///
/// The loader stores resolved outcomes, so for a loader over `V` the stored
/// value type is `Option<V>`: a cached `None` records a key the backend does
/// not have and suppresses any further fetch for it.
pub trait CacheStorage: Send + Sync + 'static {
    /// The key type of the record.
    type Key: Send + Sync + Clone + Eq + Hash + 'static;

    /// The value type of the record.
    type Value: Send + Sync + Clone + 'static;

    /// Returns the cached value for `key`, or `None` if the key has no
    /// cached outcome yet.
    fn get(&mut self, key: &Self::Key) -> Option<&Self::Value>;

    /// Puts a key-value pair into the cache, replacing any previous value.
    fn insert(&mut self, key: Self::Key, val: Self::Value);

    /// Removes the cached outcome for `key`.
    fn remove(&mut self, key: &Self::Key);

    /// Clears the cache, removing all key-value pairs.
    fn clear(&mut self);

    /// Returns an iterator over the cached key-value pairs.
    fn iter(&self) -> Box<dyn Iterator<Item = (&'_ Self::Key, &'_ Self::Value)> + '_>;
}
