use derive_setters::Setters;
use serde::{Deserialize, Serialize};

use crate::is_default;

pub const DEFAULT_MAX_SIZE: usize = 100;

/// Batching settings consumed when a request context builds its data
/// loaders. `delay` is the window length in milliseconds; `max_size` is the
/// key count at which a window dispatches immediately.
#[derive(Serialize, Deserialize, Clone, Debug, Setters, PartialEq, Eq)]
pub struct Batch {
    pub delay: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub max_size: Option<usize>,
}

impl Default for Batch {
    fn default() -> Self {
        Self { delay: 0, max_size: Some(DEFAULT_MAX_SIZE) }
    }
}
