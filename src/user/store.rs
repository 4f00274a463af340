use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::model::{User, UserPatch};

/// Backing-store failure. `Clone` because a fetch failure during a batch
/// dispatch is delivered to every request in the window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write rejected: {0}")]
    Rejected(String),
}

/// A mutation condition. `scope: None` means no tenant restriction and is
/// only produced for elevated callers; non-`Super` callers always carry an
/// explicit own-scope restriction so a cross-tenant write matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    pub id: String,
    pub scope: Option<String>,
}

impl UserFilter {
    fn matches(&self, user: &User) -> bool {
        user.id == self.id
            && self
                .scope
                .as_ref()
                .map_or(true, |scope| &user.scope == scope)
    }
}

/// The persistence collaborator. The loading core only depends on the
/// bulk-fetch-by-id shape; the write operations carry standard
/// affected-count semantics.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<HashMap<String, User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn insert_one(&self, user: User) -> Result<(), StoreError>;

    async fn update_one(&self, filter: &UserFilter, patch: &UserPatch)
        -> Result<u64, StoreError>;

    async fn delete_one(&self, filter: &UserFilter) -> Result<u64, StoreError>;
}

/// In-memory store with a fetch-call counter, for tests and demos.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, User>>,
    fetch_calls: AtomicUsize,
    fail_fetches: AtomicBool,
}

impl InMemoryUserStore {
    pub fn with_users<I>(users: I) -> Self
    where
        I: IntoIterator<Item = User>,
    {
        Self {
            users: Mutex::new(
                users
                    .into_iter()
                    .map(|user| (user.id.clone(), user))
                    .collect(),
            ),
            fetch_calls: AtomicUsize::new(0),
            fail_fetches: AtomicBool::new(false),
        }
    }

    /// Number of `fetch_by_ids` round-trips issued so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent fetch fail, to exercise window-failure paths.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<HashMap<String, User>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("backend offline".to_string()));
        }
        let users = self.users.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).cloned().map(|user| (id.clone(), user)))
            .collect())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.lock().unwrap();
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn insert_one(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.id) {
            return Err(StoreError::Rejected(format!("duplicate user id: {}", user.id)));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn update_one(
        &self,
        filter: &UserFilter,
        patch: &UserPatch,
    ) -> Result<u64, StoreError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&filter.id) {
            Some(user) if filter.matches(user) => {
                if let Some(name) = &patch.name {
                    user.name = name.clone();
                }
                if let Some(roles) = &patch.roles {
                    user.roles = roles.clone();
                }
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_one(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut users = self.users.lock().unwrap();
        match users.get(&filter.id) {
            Some(user) if filter.matches(user) => {
                users.remove(&filter.id);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
