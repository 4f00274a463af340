mod cache;
mod data_loader;
mod factory;
mod loader;
mod storage;

pub use cache::{HashMapCache, LruCache, NoCache};
pub use data_loader::DataLoader;
pub use factory::CacheFactory;
pub use loader::Loader;
pub use storage::CacheStorage;
