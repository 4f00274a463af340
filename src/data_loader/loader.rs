use std::collections::HashMap;
use std::hash::Hash;

/// Trait for batch loading.
///
/// Implementors translate one deduplicated key set into a single backend
/// round-trip. A key absent from the returned map means "not found"; the
/// [`DataLoader`](super::DataLoader) resolves and caches that outcome rather
/// than treating it as an error.
#[async_trait::async_trait]
pub trait Loader<K: Send + Sync + Hash + Eq + Clone + 'static>: Send + Sync + 'static {
    /// Type of value.
    type Value: Send + Sync + Clone + 'static;

    /// Type of error. `Clone` because a failed fetch is delivered to every
    /// request batched in the window.
    type Error: Send + Clone + 'static;

    /// Load the data set specified by the `keys`. Invoked at most once per
    /// batch window.
    async fn load(&self, keys: &[K]) -> Result<HashMap<K, Self::Value>, Self::Error>;
}
