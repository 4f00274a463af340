use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::auth::{Role, Scoped};

/// The illustrative entity behind the loader and the gated operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub roles: BTreeSet<Role>,
    pub scope: String,
}

impl Scoped for User {
    fn scope(&self) -> &str {
        &self.scope
    }
}

/// Fields an update applies. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub roles: Option<BTreeSet<Role>>,
}
