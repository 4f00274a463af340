#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod request_context;
pub mod response;
pub mod tracing;
pub mod user;

pub use error::{Error, Result};

pub fn is_default<T: Default + Eq>(val: &T) -> bool {
    *val == T::default()
}
