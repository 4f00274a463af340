use std::collections::BTreeSet;

use derive_setters::Setters;

use super::role::Role;

/// The authenticated caller, supplied by the transport layer before any
/// gated operation runs. Read-only input to the gate and to handlers that
/// filter results by scope.
#[derive(Debug, Clone, Setters)]
pub struct CallerContext {
    pub caller_id: String,
    pub roles: BTreeSet<Role>,
    /// The tenant partition the caller belongs to. Non-`Super` callers only
    /// see entities in their own partition.
    pub scope: String,
}

impl CallerContext {
    pub fn new(caller_id: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            roles: BTreeSet::new(),
            scope: scope.into(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_super(&self) -> bool {
        self.has_role(Role::Super)
    }
}
