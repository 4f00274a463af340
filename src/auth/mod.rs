mod context;
mod error;
mod gate;
mod policy;
mod role;
mod scope;

pub use context::CallerContext;
pub use error::AuthError;
pub use gate::{gate, Gate, Handler};
pub use policy::RolePolicy;
pub use role::{Role, UnknownRole};
pub use scope::{filter_visible, Scoped};
