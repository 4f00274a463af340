use std::collections::BTreeSet;
use std::fmt::{self, Display};

use super::role::Role;

/// An any-of role policy: a caller is authorized iff it holds at least one
/// of the listed roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePolicy {
    roles: BTreeSet<Role>,
}

impl RolePolicy {
    pub fn any<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        Self { roles: roles.into_iter().collect() }
    }

    pub fn allows(&self, caller_roles: &BTreeSet<Role>) -> bool {
        self.roles.iter().any(|role| caller_roles.contains(role))
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }
}

impl Display for RolePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for role in &self.roles {
            if !first {
                f.write_str(", ")?;
            }
            Display::fmt(role, f)?;
            first = false;
        }
        Ok(())
    }
}
