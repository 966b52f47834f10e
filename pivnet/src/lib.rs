//! Blocking client for the Pivotal Network v2 API.
//!
//! See https://network.pivotal.io/docs/api

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod errors;
pub use errors::ApiError;

pub mod v2;
