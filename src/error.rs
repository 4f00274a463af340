use derive_more::From;

use crate::auth::AuthError;
use crate::user::StoreError;

/// Failure taxonomy for gated operations. Everything here is a value that
/// travels through `Result`; only the operation boundary turns it into a
/// [`Response`](crate::response::Response).
///
/// `Clone` because a failed batch window fans the same error out to every
/// waiter.
#[derive(From, thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Auth(AuthError),

    #[from(ignore)]
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[from(ignore)]
    #[error("validation failed: {}", _0)]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),
}

pub type Result<A> = std::result::Result<A, Error>;

impl Error {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound { entity, id: id.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
