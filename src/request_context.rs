use std::sync::Arc;

use derive_setters::Setters;

use crate::auth::CallerContext;
use crate::config::Batch;
use crate::data_loader::DataLoader;
use crate::user::{UserLoader, UserStore};

/// Per-request composition root. Built fresh at request start and discarded
/// at request end, so the loader cache never outlives one unit of work and
/// cached entities cannot leak across callers.
#[derive(Setters)]
pub struct RequestContext {
    pub caller: CallerContext,
    pub store: Arc<dyn UserStore>,
    pub users: DataLoader<String, UserLoader>,
}

impl RequestContext {
    pub fn new(caller: CallerContext, store: Arc<dyn UserStore>, batch: &Batch) -> Self {
        let users = UserLoader::new(store.clone()).to_data_loader(batch);
        RequestContext { caller, store, users }
    }
}
