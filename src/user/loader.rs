use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Batch, DEFAULT_MAX_SIZE};
use crate::data_loader::{DataLoader, Loader};

use super::store::{StoreError, UserStore};

/// Batch-fetch adapter between the [`DataLoader`] and the [`UserStore`]
/// collaborator.
pub struct UserLoader {
    store: Arc<dyn UserStore>,
}

impl UserLoader {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        UserLoader { store }
    }

    pub fn to_data_loader(self, batch: &Batch) -> DataLoader<String, UserLoader> {
        let max_size = batch.max_size.unwrap_or(DEFAULT_MAX_SIZE);
        DataLoader::new(self)
            .delay(Duration::from_millis(batch.delay as u64))
            .max_batch_size(max_size)
    }
}

#[async_trait::async_trait]
impl Loader<String> for UserLoader {
    type Value = super::model::User;
    type Error = StoreError;

    async fn load(
        &self,
        keys: &[String],
    ) -> Result<HashMap<String, Self::Value>, Self::Error> {
        self.store.fetch_by_ids(keys).await
    }
}
