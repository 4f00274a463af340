use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_channel::oneshot;

use super::cache::HashMapCache;
use super::factory::CacheFactory;
use super::loader::Loader;
use super::storage::CacheStorage;

/// A resolved outcome for one key: `Some(value)` when the backend has the
/// key, `None` when it does not. Both are cached.
type Outcome<T, K> = Option<<T as Loader<K>>::Value>;

type WindowResult<K, T> = Result<HashMap<K, Outcome<T, K>>, <T as Loader<K>>::Error>;

struct ResSender<K, T>
where
    K: Send + Sync + Eq + Clone + Hash + 'static,
    T: Loader<K>,
{
    use_cache_values: HashMap<K, Outcome<T, K>>,
    tx: oneshot::Sender<WindowResult<K, T>>,
}

type KeysAndSender<K, T> = (HashSet<K>, Vec<(HashSet<K>, ResSender<K, T>)>);

struct Requests<K, T, C>
where
    K: Send + Sync + Eq + Clone + Hash + 'static,
    T: Loader<K>,
    C: CacheFactory<K, Outcome<T, K>>,
{
    keys: HashSet<K>,
    pending: Vec<(HashSet<K>, ResSender<K, T>)>,
    cache_storage: C::Storage,
}

impl<K, T, C> Requests<K, T, C>
where
    K: Send + Sync + Eq + Clone + Hash + 'static,
    T: Loader<K>,
    C: CacheFactory<K, Outcome<T, K>>,
{
    fn new(cache_factory: &C) -> Self {
        Self {
            keys: HashSet::new(),
            pending: Vec::new(),
            cache_storage: cache_factory.create(),
        }
    }

    fn take(&mut self) -> KeysAndSender<K, T> {
        (
            std::mem::take(&mut self.keys),
            std::mem::take(&mut self.pending),
        )
    }
}

struct DataLoaderInner<K, T, C>
where
    K: Send + Sync + Eq + Clone + Hash + 'static,
    T: Loader<K>,
    C: CacheFactory<K, Outcome<T, K>>,
{
    requests: Mutex<Requests<K, T, C>>,
    loader: T,
}

impl<K, T, C> DataLoaderInner<K, T, C>
where
    K: Send + Sync + Eq + Clone + Hash + 'static,
    T: Loader<K>,
    C: CacheFactory<K, Outcome<T, K>>,
{
    async fn do_load(&self, (keys, senders): KeysAndSender<K, T>) {
        let keys_vec = keys.iter().cloned().collect::<Vec<_>>();
        tracing::debug!(keys = keys_vec.len(), "dispatching batch window");

        match self.loader.load(&keys_vec).await {
            Ok(mut values) => {
                // Every requested key gets an outcome, found or not.
                let mut outcomes: HashMap<K, Outcome<T, K>> = HashMap::with_capacity(keys.len());
                for key in keys {
                    let value = values.remove(&key);
                    outcomes.insert(key, value);
                }

                {
                    let mut requests = self.requests.lock().unwrap();
                    for (key, outcome) in &outcomes {
                        requests.cache_storage.insert(key.clone(), outcome.clone());
                    }
                }

                for (keys, sender) in senders {
                    let mut res = sender.use_cache_values;
                    for key in keys {
                        let outcome = outcomes.get(&key).cloned().flatten();
                        res.insert(key, outcome);
                    }
                    let _ = sender.tx.send(Ok(res));
                }
            }
            Err(err) => {
                tracing::warn!(keys = keys.len(), "batch fetch failed");
                // A window fails atomically: every waiter gets the same error.
                for (_, sender) in senders {
                    let _ = sender.tx.send(Err(err.clone()));
                }
            }
        }
    }
}

/// Request-scoped batching cache.
///
/// Collects `load_one`/`load_many` calls issued within one batch window and
/// services them with a single [`Loader::load`] call over the deduplicated
/// key set. Outcomes (including "not found") are cached for the lifetime of
/// the loader instance, which is intended to be one request.
///
/// Reference: <https://github.com/facebook/dataloader>
pub struct DataLoader<K, T, C = HashMapCache>
where
    K: Send + Sync + Eq + Clone + Hash + 'static,
    T: Loader<K>,
    C: CacheFactory<K, Outcome<T, K>>,
{
    inner: Arc<DataLoaderInner<K, T, C>>,
    delay: Duration,
    max_batch_size: usize,
}

impl<K, T> DataLoader<K, T, HashMapCache>
where
    K: Send + Sync + Eq + Clone + Hash + 'static,
    T: Loader<K>,
{
    pub fn new(loader: T) -> Self {
        Self::with_cache(loader, HashMapCache)
    }
}

impl<K, T, C> DataLoader<K, T, C>
where
    K: Send + Sync + Eq + Clone + Hash + 'static,
    T: Loader<K>,
    C: CacheFactory<K, Outcome<T, K>>,
{
    /// Use `Loader` to create a [`DataLoader`] with the given cache policy.
    pub fn with_cache(loader: T, cache_factory: C) -> Self {
        Self {
            inner: Arc::new(DataLoaderInner {
                requests: Mutex::new(Requests::new(&cache_factory)),
                loader,
            }),
            delay: Duration::from_millis(1),
            max_batch_size: 1000,
        }
    }

    /// Specify the delay time for loading data, the default is `1ms`.
    #[must_use]
    pub fn delay(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }

    /// Specify the max batch size for loading data, the default is `1000`.
    ///
    /// If the keys waiting to be loaded reach the threshold, they are loaded
    /// immediately.
    #[must_use]
    pub fn max_batch_size(self, max_batch_size: usize) -> Self {
        Self { max_batch_size, ..self }
    }

    /// Get the loader.
    #[inline]
    pub fn loader(&self) -> &T {
        &self.inner.loader
    }

    /// Load one key. Resolves from cache when the outcome is already known
    /// (including a cached "not found"), otherwise joins the open batch
    /// window. `Ok(None)` means the backend does not have the key.
    pub async fn load_one(&self, key: K) -> Result<Option<T::Value>, T::Error> {
        let mut outcomes = self.resolve(std::iter::once(key.clone())).await?;
        Ok(outcomes.remove(&key).flatten())
    }

    /// Load many keys. The result mirrors the input: same order, duplicates
    /// preserved, even though the underlying fetch sees the deduplicated key
    /// set.
    pub async fn load_many<I>(&self, keys: I) -> Result<Vec<Option<T::Value>>, T::Error>
    where
        I: IntoIterator<Item = K>,
    {
        let keys: Vec<K> = keys.into_iter().collect();
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let outcomes = self.resolve(keys.iter().cloned()).await?;
        Ok(keys
            .into_iter()
            .map(|key| outcomes.get(&key).cloned().flatten())
            .collect())
    }

    async fn resolve<I>(&self, keys: I) -> WindowResult<K, T>
    where
        I: IntoIterator<Item = K>,
    {
        enum Action<K, T>
        where
            K: Send + Sync + Eq + Clone + Hash + 'static,
            T: Loader<K>,
        {
            ImmediateLoad(KeysAndSender<K, T>),
            StartFetch,
            Delay,
        }

        let (action, rx) = {
            let mut requests = self.inner.requests.lock().unwrap();
            let prev_count = requests.keys.len();
            let mut keys_set = HashSet::new();
            let mut use_cache_values = HashMap::new();

            for key in keys {
                if let Some(outcome) = requests.cache_storage.get(&key) {
                    // Already resolved within this loader's lifetime.
                    use_cache_values.insert(key.clone(), outcome.clone());
                } else {
                    keys_set.insert(key);
                }
            }

            if keys_set.is_empty() {
                return Ok(use_cache_values);
            }

            requests.keys.extend(keys_set.iter().cloned());
            let (tx, rx) = oneshot::channel();
            requests
                .pending
                .push((keys_set, ResSender { use_cache_values, tx }));

            if requests.keys.len() >= self.max_batch_size {
                (Action::ImmediateLoad(requests.take()), rx)
            } else if prev_count == 0 {
                (Action::StartFetch, rx)
            } else {
                (Action::Delay, rx)
            }
        };

        match action {
            Action::ImmediateLoad(window) => {
                let inner = self.inner.clone();
                tokio::spawn(async move { inner.do_load(window).await });
            }
            Action::StartFetch => {
                let inner = self.inner.clone();
                let delay = self.delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let window = inner.requests.lock().unwrap().take();
                    if !window.0.is_empty() {
                        inner.do_load(window).await;
                    }
                });
            }
            Action::Delay => {}
        }

        rx.await.unwrap()
    }

    /// Feed some data into the cache.
    pub async fn feed_many<I>(&self, values: I)
    where
        I: IntoIterator<Item = (K, T::Value)>,
    {
        let mut requests = self.inner.requests.lock().unwrap();
        for (key, value) in values {
            requests.cache_storage.insert(key, Some(value));
        }
    }

    /// Feed one record into the cache.
    pub async fn feed_one(&self, key: K, value: T::Value) {
        self.feed_many(std::iter::once((key, value))).await;
    }

    /// Drop the cached outcome for `key`, forcing the next load to fetch.
    /// Mutating operations call this after a write so the request does not
    /// observe the pre-write value.
    pub fn invalidate(&self, key: &K) {
        let mut requests = self.inner.requests.lock().unwrap();
        requests.cache_storage.remove(key);
    }

    /// Clears the cache.
    pub fn clear(&self) {
        let mut requests = self.inner.requests.lock().unwrap();
        requests.cache_storage.clear();
    }

    /// Gets all outcomes in the cache.
    pub fn cached_values(&self) -> HashMap<K, Option<T::Value>> {
        let requests = self.inner.requests.lock().unwrap();
        requests
            .cache_storage
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
