use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::NonZeroUsize;

use super::factory::CacheFactory;
use super::storage::CacheStorage;

/// No cache. Every load enters a batch window; only in-window deduplication
/// applies.
pub struct NoCache;

impl<K, V> CacheFactory<K, V> for NoCache
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    type Storage = NoCacheImpl<K, V>;

    fn create(&self) -> Self::Storage {
        NoCacheImpl { _mark1: PhantomData, _mark2: PhantomData }
    }
}

pub struct NoCacheImpl<K, V> {
    _mark1: PhantomData<K>,
    _mark2: PhantomData<V>,
}

impl<K, V> CacheStorage for NoCacheImpl<K, V>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    type Key = K;
    type Value = V;

    #[inline]
    fn get(&mut self, _key: &K) -> Option<&V> {
        None
    }

    #[inline]
    fn insert(&mut self, _key: K, _val: V) {}

    #[inline]
    fn remove(&mut self, _key: &K) {}

    #[inline]
    fn clear(&mut self) {}

    fn iter(&self) -> Box<dyn Iterator<Item = (&'_ K, &'_ V)> + '_> {
        Box::new(std::iter::empty())
    }
}

/// Unbounded [`HashMap`] cache. The default policy: the loader lives for one
/// request, so the cache is bounded by the request's working set.
#[derive(Default)]
pub struct HashMapCache;

impl<K, V> CacheFactory<K, V> for HashMapCache
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    type Storage = HashMapCacheImpl<K, V>;

    fn create(&self) -> Self::Storage {
        HashMapCacheImpl(HashMap::new())
    }
}

pub struct HashMapCacheImpl<K, V>(HashMap<K, V>);

impl<K, V> CacheStorage for HashMapCacheImpl<K, V>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    type Key = K;
    type Value = V;

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        self.0.get(key)
    }

    #[inline]
    fn insert(&mut self, key: K, val: V) {
        self.0.insert(key, val);
    }

    #[inline]
    fn remove(&mut self, key: &K) {
        self.0.remove(key);
    }

    #[inline]
    fn clear(&mut self) {
        self.0.clear();
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&'_ K, &'_ V)> + '_> {
        Box::new(self.0.iter())
    }
}

/// LRU cache, for loaders that outlive a single request and need a bound on
/// retained outcomes.
pub struct LruCache {
    cap: NonZeroUsize,
}

impl LruCache {
    /// Creates a new LRU cache that holds at most `cap` items.
    pub fn new(cap: NonZeroUsize) -> Self {
        Self { cap }
    }
}

impl<K, V> CacheFactory<K, V> for LruCache
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    type Storage = LruCacheImpl<K, V>;

    fn create(&self) -> Self::Storage {
        LruCacheImpl(lru::LruCache::new(self.cap))
    }
}

pub struct LruCacheImpl<K, V>(lru::LruCache<K, V>);

impl<K, V> CacheStorage for LruCacheImpl<K, V>
where
    K: Send + Sync + Clone + Eq + Hash + 'static,
    V: Send + Sync + Clone + 'static,
{
    type Key = K;
    type Value = V;

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        self.0.get(key)
    }

    #[inline]
    fn insert(&mut self, key: K, val: V) {
        self.0.put(key, val);
    }

    #[inline]
    fn remove(&mut self, key: &K) {
        self.0.pop(key);
    }

    #[inline]
    fn clear(&mut self) {
        self.0.clear();
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&'_ K, &'_ V)> + '_> {
        Box::new(self.0.iter())
    }
}
